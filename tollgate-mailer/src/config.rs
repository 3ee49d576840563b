use crate::transports::TlsConfig;
use crate::{FileTransport, Mailer, MailerError, MemoryTransport, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
    /// Keep messages in process memory; nothing leaves the host
    Memory,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    None,
    StartTls,
    Tls,
}

impl From<TlsType> for TlsConfig {
    fn from(tls_type: TlsType) -> Self {
        match tls_type {
            TlsType::None => TlsConfig::None,
            TlsType::StartTls => TlsConfig::StartTls,
            TlsType::Tls => TlsConfig::Tls,
        }
    }
}

impl TlsType {
    fn parse(value: &str) -> Result<Self, MailerError> {
        match value.to_lowercase().as_str() {
            "none" => Ok(TlsType::None),
            "starttls" => Ok(TlsType::StartTls),
            "tls" => Ok(TlsType::Tls),
            other => Err(MailerError::Config(format!(
                "MAILER_SMTP_TLS must be one of none, starttls, tls (got {other})"
            ))),
        }
    }
}

impl MailerConfig {
    /// Read the mailer configuration from `MAILER_*` environment variables
    ///
    /// `MAILER_SMTP_HOST` selects SMTP, otherwise `MAILER_FILE_OUTPUT_DIR`
    /// selects the file transport. With neither set, emails are written to
    /// `./emails`.
    pub fn from_env() -> Result<Self, MailerError> {
        let transport = if let Ok(host) = std::env::var("MAILER_SMTP_HOST") {
            let port = match std::env::var("MAILER_SMTP_PORT") {
                Ok(port) => Some(port.parse().map_err(|_| {
                    MailerError::Config(format!("MAILER_SMTP_PORT is not a port number: {port}"))
                })?),
                Err(_) => None,
            };
            let tls = match std::env::var("MAILER_SMTP_TLS") {
                Ok(tls) => Some(TlsType::parse(&tls)?),
                Err(_) => None,
            };

            TransportConfig::Smtp {
                host,
                port,
                username: std::env::var("MAILER_SMTP_USERNAME").ok(),
                password: std::env::var("MAILER_SMTP_PASSWORD").ok(),
                tls,
            }
        } else if let Ok(output_dir) = std::env::var("MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else {
            TransportConfig::default()
        };

        let defaults = Self::default();
        Ok(Self {
            transport,
            from_address: std::env::var("MAILER_FROM_ADDRESS").unwrap_or(defaults.from_address),
            from_name: std::env::var("MAILER_FROM_NAME").ok().or(defaults.from_name),
            app_name: std::env::var("MAILER_APP_NAME").unwrap_or(defaults.app_name),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let mut builder = SmtpTransport::builder(host);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(username, password);
                }

                if let Some(tls) = tls {
                    builder = builder.tls((*tls).into());
                }

                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
            TransportConfig::Memory => Ok(Box::new(MemoryTransport::new())),
        }
    }

    /// The `From` header value, with the display name when one is configured
    pub fn from_header(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_address),
            None => self.from_address.clone(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::File {
            output_dir: PathBuf::from("./emails"),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            from_address: "no-reply@tollgate.local".to_string(),
            from_name: Some("Tollgate".to_string()),
            app_name: "Tollgate".to_string(),
        }
    }
}
