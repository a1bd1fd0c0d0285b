use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use moneymate_crypto::{
    Entity, EntityKind, KdfParams, Salt, Session, decrypt_entities, decrypt_entity_detailed,
    encrypt_entities, generate_recovery_key, hash_recovery_key, reencrypt_entities, self_test,
    validate_password_strength,
};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct RecordArgs {
    /// Entity kind whose sensitive fields are processed (e.g. income, creditCard)
    #[arg(long, required_unless_present = "fields")]
    kind: Option<EntityKind>,

    /// Comma-separated field names, overriding --kind
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// User salt as 32 hex characters or base64
    #[arg(long, env = "MONEYMATE_SALT")]
    salt: String,

    /// Read JSON records from this file instead of stdin
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

impl RecordArgs {
    fn field_names(&self) -> Vec<String> {
        if !self.fields.is_empty() {
            return self.fields.clone();
        }
        self.kind
            .map(|k| k.sensitive_fields().iter().map(|f| f.to_string()).collect())
            .unwrap_or_default()
    }

    fn salt(&self) -> Result<Salt> {
        Salt::parse(&self.salt).context("invalid salt")
    }

    fn load(&self) -> Result<Records> {
        let raw = match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        let value: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
        Records::from_value(value)
    }
}

/// A single JSON object or an array of them; output keeps the input shape.
struct Records {
    single: bool,
    entities: Vec<Entity>,
}

impl Records {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                single: true,
                entities: vec![map],
            }),
            Value::Array(items) => {
                let entities = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Ok(map),
                        _ => bail!("every array element must be a JSON object"),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self {
                    single: false,
                    entities,
                })
            }
            _ => bail!("input must be a JSON object or an array of objects"),
        }
    }

    fn print(single: bool, entities: Vec<Entity>) -> Result<()> {
        let value = if single {
            entities.into_iter().next().map(Value::Object).unwrap_or(Value::Null)
        } else {
            Value::Array(entities.into_iter().map(Value::Object).collect())
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

fn resolve_kdf(iterations: Option<u32>) -> Result<KdfParams> {
    match iterations {
        Some(n) => Ok(KdfParams::new(n)?),
        None => Ok(KdfParams::default()),
    }
}

fn unlock(args: &RecordArgs, kdf: KdfParams) -> Result<Session> {
    let salt = args.salt()?;
    let password = auth::read_password(auth::PASSWORD_VAR, false)?;
    Session::unlock(password, salt, kdf).context("failed to derive encryption key")
}

#[derive(Debug, Parser)]
#[command(name = "moneymate-crypto")]
#[command(
    version,
    about = "Field-level encryption tools for personal finance records."
)]
struct Cli {
    /// PBKDF2 iteration count (default: 100000, minimum: 100000)
    #[arg(long, global = true, env = "MONEYMATE_KDF_ITERATIONS")]
    iterations: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generates a new 16-byte user salt
    Salt {
        /// Print base64 instead of hex
        #[arg(long, default_value_t = false)]
        base64: bool,
    },

    /// Checks a password against the strength policy
    CheckPassword,

    /// Adds encrypted siblings to the sensitive fields of JSON records
    Encrypt(RecordArgs),

    /// Decrypts the sensitive fields of JSON records
    Decrypt {
        #[command(flatten)]
        records: RecordArgs,

        /// Report fields that could not be decrypted on stderr
        #[arg(long, default_value_t = false)]
        report: bool,
    },

    /// Re-encrypts JSON records from the current password to a new one
    Rekey(RecordArgs),

    /// Generates a recovery mnemonic and the hash to store server-side
    RecoveryKey,

    /// Runs an encrypt/decrypt round trip
    SelfTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let kdf = resolve_kdf(args.iterations)?;

    match args.command {
        Commands::Salt { base64 } => {
            let salt = Salt::generate()?;
            if base64 {
                println!("{}", salt.to_base64());
            } else {
                println!("{}", salt.to_hex());
            }
        }
        Commands::CheckPassword => {
            let password = auth::read_password(auth::PASSWORD_VAR, true)?;
            let strength = validate_password_strength(&password);
            if !strength.valid {
                for error in &strength.errors {
                    println!("{error}");
                }
                bail!("password does not meet strength requirements");
            }
            println!("password ok");
        }
        Commands::Encrypt(records_args) => {
            let records = records_args.load()?;
            let session = unlock(&records_args, kdf)?;
            let fields = records_args.field_names();
            let out = encrypt_entities(records.entities, &fields, session.key()).await?;
            Records::print(records.single, out)?;
        }
        Commands::Decrypt {
            records: records_args,
            report,
        } => {
            let records = records_args.load()?;
            let session = unlock(&records_args, kdf)?;
            let fields = records_args.field_names();
            let out = if report {
                let mut out = Vec::with_capacity(records.entities.len());
                for (index, entity) in records.entities.iter().enumerate() {
                    let detailed = decrypt_entity_detailed(entity, &fields, session.key());
                    if !detailed.is_complete() {
                        eprintln!(
                            "record {index}: could not decrypt {}",
                            detailed.failed_fields.join(", ")
                        );
                    }
                    out.push(detailed.entity);
                }
                out
            } else {
                decrypt_entities(records.entities, &fields, session.key()).await?
            };
            Records::print(records.single, out)?;
        }
        Commands::Rekey(records_args) => {
            let records = records_args.load()?;
            let session = unlock(&records_args, kdf)?;
            let new_password = auth::read_new_password_with_confirmation()?;
            let next = session.change_password(new_password)?;
            let fields = records_args.field_names();
            let out = reencrypt_entities(
                &records.entities,
                &fields,
                session.key(),
                next.key(),
                |progress| {
                    tracing::debug!(
                        phase = ?progress.phase,
                        current = progress.current,
                        total = progress.total,
                        "re-encryption progress"
                    )
                },
            )?;
            Records::print(records.single, out)?;
        }
        Commands::RecoveryKey => {
            let mnemonic = generate_recovery_key()?;
            println!("{}", *mnemonic);
            println!("hash: {}", hash_recovery_key(&mnemonic));
        }
        Commands::SelfTest => {
            if !self_test()? {
                bail!("self-test failed");
            }
            println!("self-test passed");
        }
    }

    Ok(())
}
