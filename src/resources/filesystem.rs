//! Storage backend block shared by users, folders and group user settings
//!
//! The configuration record carries one optional sub-object per provider,
//! like the wire format. Internally the active one is lifted into
//! [`Backend`], so encoding writes exactly one sub-config and decoding
//! keeps exactly one, whatever else the server echoes.

use declarative::{Attribute, AttributeType, Diagnostics, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::models::{
    AzBlobConfig, CryptConfig, Filesystem, GcsConfig, HttpFsConfig, OsConfig, S3Config, Secret,
    SftpFsConfig,
};

/// Provider codes and the sub-object each one uses.
pub const PROVIDERS: [(i64, &str); 7] = [
    (0, "osconfig"),
    (1, "s3config"),
    (2, "gcsconfig"),
    (3, "azblobconfig"),
    (4, "cryptconfig"),
    (5, "sftpconfig"),
    (6, "httpconfig"),
];

/// Filesystem block as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemModel {
    pub provider: i64,
    pub osconfig: Option<OsConfig>,
    pub s3config: Option<S3Fs>,
    pub gcsconfig: Option<GcsFs>,
    pub azblobconfig: Option<AzBlobFs>,
    pub cryptconfig: Option<CryptFs>,
    pub sftpconfig: Option<SftpFs>,
    pub httpconfig: Option<HttpFs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Fs {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub access_secret: Option<String>,
    pub role_arn: String,
    pub endpoint: String,
    pub storage_class: String,
    pub acl: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_concurrency: i64,
    pub upload_part_max_time: i64,
    pub download_part_size: i64,
    pub download_concurrency: i64,
    pub download_part_max_time: i64,
    pub force_path_style: bool,
    pub skip_tls_verify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsFs {
    pub bucket: String,
    pub credentials: Option<String>,
    pub automatic_credentials: i64,
    pub storage_class: String,
    pub acl: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_part_max_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzBlobFs {
    pub container: String,
    pub account_name: String,
    pub account_key: Option<String>,
    pub sas_url: Option<String>,
    pub endpoint: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_concurrency: i64,
    pub download_part_size: i64,
    pub download_concurrency: i64,
    pub use_emulator: bool,
    pub access_tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptFs {
    pub passphrase: Option<String>,
    pub read_buffer_size: i64,
    pub write_buffer_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SftpFs {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub key_passphrase: Option<String>,
    pub fingerprints: Vec<String>,
    pub prefix: String,
    pub disable_concurrent_reads: bool,
    pub buffer_size: i64,
    pub equality_check_mode: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpFs {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub skip_tls_verify: bool,
    pub equality_check_mode: i64,
}

/// The active storage backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Local(OsConfig),
    S3(S3Fs),
    Gcs(GcsFs),
    AzureBlob(AzBlobFs),
    Encrypted(CryptFs),
    Sftp(SftpFs),
    Http(HttpFs),
}

impl Backend {
    /// Select the backend named by `model.provider`. Unknown codes fall
    /// back to local storage; [`validate`] rejects them earlier.
    pub fn from_model(model: &FilesystemModel) -> Self {
        match model.provider {
            1 => Self::S3(model.s3config.clone().unwrap_or_default()),
            2 => Self::Gcs(model.gcsconfig.clone().unwrap_or_default()),
            3 => Self::AzureBlob(model.azblobconfig.clone().unwrap_or_default()),
            4 => Self::Encrypted(model.cryptconfig.clone().unwrap_or_default()),
            5 => Self::Sftp(model.sftpconfig.clone().unwrap_or_default()),
            6 => Self::Http(model.httpconfig.clone().unwrap_or_default()),
            _ => Self::Local(model.osconfig.clone().unwrap_or_default()),
        }
    }

    pub fn provider(&self) -> i64 {
        match self {
            Self::Local(_) => 0,
            Self::S3(_) => 1,
            Self::Gcs(_) => 2,
            Self::AzureBlob(_) => 3,
            Self::Encrypted(_) => 4,
            Self::Sftp(_) => 5,
            Self::Http(_) => 6,
        }
    }

    pub fn into_model(self) -> FilesystemModel {
        let mut model = FilesystemModel {
            provider: self.provider(),
            ..FilesystemModel::default()
        };
        match self {
            Self::Local(c) => model.osconfig = Some(c),
            Self::S3(c) => model.s3config = Some(c),
            Self::Gcs(c) => model.gcsconfig = Some(c),
            Self::AzureBlob(c) => model.azblobconfig = Some(c),
            Self::Encrypted(c) => model.cryptconfig = Some(c),
            Self::Sftp(c) => model.sftpconfig = Some(c),
            Self::Http(c) => model.httpconfig = Some(c),
        }
        model
    }

    /// Wire block holding only the active sub-config.
    pub fn to_wire(&self) -> Filesystem {
        let mut fs = Filesystem {
            provider: self.provider(),
            ..Filesystem::default()
        };
        match self {
            Self::Local(c) => fs.osconfig = Some(c.clone()),
            Self::S3(c) => {
                fs.s3config = Some(S3Config {
                    bucket: c.bucket.clone(),
                    region: c.region.clone(),
                    access_key: c.access_key.clone(),
                    access_secret: seal(c.access_secret.as_ref()),
                    role_arn: c.role_arn.clone(),
                    endpoint: c.endpoint.clone(),
                    storage_class: c.storage_class.clone(),
                    acl: c.acl.clone(),
                    key_prefix: c.key_prefix.clone(),
                    upload_part_size: c.upload_part_size,
                    upload_concurrency: c.upload_concurrency,
                    upload_part_max_time: c.upload_part_max_time,
                    download_part_size: c.download_part_size,
                    download_concurrency: c.download_concurrency,
                    download_part_max_time: c.download_part_max_time,
                    force_path_style: c.force_path_style,
                    skip_tls_verify: c.skip_tls_verify,
                });
            }
            Self::Gcs(c) => {
                fs.gcsconfig = Some(GcsConfig {
                    bucket: c.bucket.clone(),
                    credentials: seal(c.credentials.as_ref()),
                    automatic_credentials: c.automatic_credentials,
                    storage_class: c.storage_class.clone(),
                    acl: c.acl.clone(),
                    key_prefix: c.key_prefix.clone(),
                    upload_part_size: c.upload_part_size,
                    upload_part_max_time: c.upload_part_max_time,
                });
            }
            Self::AzureBlob(c) => {
                fs.azblobconfig = Some(AzBlobConfig {
                    container: c.container.clone(),
                    account_name: c.account_name.clone(),
                    account_key: seal(c.account_key.as_ref()),
                    sas_url: seal(c.sas_url.as_ref()),
                    endpoint: c.endpoint.clone(),
                    key_prefix: c.key_prefix.clone(),
                    upload_part_size: c.upload_part_size,
                    upload_concurrency: c.upload_concurrency,
                    download_part_size: c.download_part_size,
                    download_concurrency: c.download_concurrency,
                    use_emulator: c.use_emulator,
                    access_tier: c.access_tier.clone(),
                });
            }
            Self::Encrypted(c) => {
                fs.cryptconfig = Some(CryptConfig {
                    passphrase: seal(c.passphrase.as_ref()),
                    read_buffer_size: c.read_buffer_size,
                    write_buffer_size: c.write_buffer_size,
                });
            }
            Self::Sftp(c) => {
                fs.sftpconfig = Some(SftpFsConfig {
                    endpoint: c.endpoint.clone(),
                    username: c.username.clone(),
                    password: seal(c.password.as_ref()),
                    private_key: seal(c.private_key.as_ref()),
                    key_passphrase: seal(c.key_passphrase.as_ref()),
                    fingerprints: c.fingerprints.clone(),
                    prefix: c.prefix.clone(),
                    disable_concurrent_reads: c.disable_concurrent_reads,
                    buffer_size: c.buffer_size,
                    equality_check_mode: c.equality_check_mode,
                });
            }
            Self::Http(c) => {
                fs.httpconfig = Some(HttpFsConfig {
                    endpoint: c.endpoint.clone(),
                    username: c.username.clone(),
                    password: seal(c.password.as_ref()),
                    api_key: seal(c.api_key.as_ref()),
                    skip_tls_verify: c.skip_tls_verify,
                    equality_check_mode: c.equality_check_mode,
                });
            }
        }
        fs
    }

    /// Lift the active sub-config out of a server echo.
    pub fn from_wire(fs: Filesystem) -> Self {
        match fs.provider {
            1 => {
                let c = fs.s3config.unwrap_or_default();
                Self::S3(S3Fs {
                    access_secret: unseal(c.access_secret),
                    bucket: c.bucket,
                    region: c.region,
                    access_key: c.access_key,
                    role_arn: c.role_arn,
                    endpoint: c.endpoint,
                    storage_class: c.storage_class,
                    acl: c.acl,
                    key_prefix: c.key_prefix,
                    upload_part_size: c.upload_part_size,
                    upload_concurrency: c.upload_concurrency,
                    upload_part_max_time: c.upload_part_max_time,
                    download_part_size: c.download_part_size,
                    download_concurrency: c.download_concurrency,
                    download_part_max_time: c.download_part_max_time,
                    force_path_style: c.force_path_style,
                    skip_tls_verify: c.skip_tls_verify,
                })
            }
            2 => {
                let c = fs.gcsconfig.unwrap_or_default();
                Self::Gcs(GcsFs {
                    credentials: unseal(c.credentials),
                    bucket: c.bucket,
                    automatic_credentials: c.automatic_credentials,
                    storage_class: c.storage_class,
                    acl: c.acl,
                    key_prefix: c.key_prefix,
                    upload_part_size: c.upload_part_size,
                    upload_part_max_time: c.upload_part_max_time,
                })
            }
            3 => {
                let c = fs.azblobconfig.unwrap_or_default();
                Self::AzureBlob(AzBlobFs {
                    account_key: unseal(c.account_key),
                    sas_url: unseal(c.sas_url),
                    container: c.container,
                    account_name: c.account_name,
                    endpoint: c.endpoint,
                    key_prefix: c.key_prefix,
                    upload_part_size: c.upload_part_size,
                    upload_concurrency: c.upload_concurrency,
                    download_part_size: c.download_part_size,
                    download_concurrency: c.download_concurrency,
                    use_emulator: c.use_emulator,
                    access_tier: c.access_tier,
                })
            }
            4 => {
                let c = fs.cryptconfig.unwrap_or_default();
                Self::Encrypted(CryptFs {
                    passphrase: unseal(c.passphrase),
                    read_buffer_size: c.read_buffer_size,
                    write_buffer_size: c.write_buffer_size,
                })
            }
            5 => {
                let c = fs.sftpconfig.unwrap_or_default();
                Self::Sftp(SftpFs {
                    password: unseal(c.password),
                    private_key: unseal(c.private_key),
                    key_passphrase: unseal(c.key_passphrase),
                    endpoint: c.endpoint,
                    username: c.username,
                    fingerprints: c.fingerprints,
                    prefix: c.prefix,
                    disable_concurrent_reads: c.disable_concurrent_reads,
                    buffer_size: c.buffer_size,
                    equality_check_mode: c.equality_check_mode,
                })
            }
            6 => {
                let c = fs.httpconfig.unwrap_or_default();
                Self::Http(HttpFs {
                    password: unseal(c.password),
                    api_key: unseal(c.api_key),
                    endpoint: c.endpoint,
                    username: c.username,
                    skip_tls_verify: c.skip_tls_verify,
                    equality_check_mode: c.equality_check_mode,
                })
            }
            _ => Self::Local(fs.osconfig.unwrap_or_default()),
        }
    }

    /// Secret attribute names of this backend, relative to its sub-object.
    fn secret_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Local(_) => &[],
            Self::S3(_) => &["access_secret"],
            Self::Gcs(_) => &["credentials"],
            Self::AzureBlob(_) => &["account_key", "sas_url"],
            Self::Encrypted(_) => &["passphrase"],
            Self::Sftp(_) => &["password", "private_key", "key_passphrase"],
            Self::Http(_) => &["password", "api_key"],
        }
    }

    fn config_name(&self) -> &'static str {
        PROVIDERS[self.provider() as usize].1
    }
}

impl FilesystemModel {
    pub fn to_wire(&self) -> Filesystem {
        Backend::from_model(self).to_wire()
    }

    pub fn from_wire(fs: Filesystem) -> Self {
        Backend::from_wire(fs).into_model()
    }

    /// JSON pointers of the active backend's secrets below `prefix`.
    pub fn secret_paths(&self, prefix: &str) -> Vec<String> {
        let backend = Backend::from_model(self);
        let config = backend.config_name();
        backend
            .secret_fields()
            .iter()
            .map(|field| format!("{prefix}/{config}/{field}"))
            .collect()
    }
}

/// Wire block for an optional configuration block; unset means local.
pub fn encode(model: Option<&FilesystemModel>) -> Filesystem {
    model.map(FilesystemModel::to_wire).unwrap_or_default()
}

fn seal(plain: Option<&String>) -> Option<Secret> {
    plain.map(|p| Secret::plain(p.as_str()))
}

/// The server never returns plaintext; keep whatever it echoes.
fn unseal(secret: Option<Secret>) -> Option<String> {
    secret.filter(|s| !s.is_empty()).map(|s| s.payload)
}

/// Provider code in range and no sub-config for another provider.
pub fn validate(d: &mut Diagnostics, path: &str, model: &FilesystemModel) {
    d.int_between(&format!("{path}/provider"), Some(model.provider), 0, 6);

    let present = [
        model.osconfig.is_some(),
        model.s3config.is_some(),
        model.gcsconfig.is_some(),
        model.azblobconfig.is_some(),
        model.cryptconfig.is_some(),
        model.sftpconfig.is_some(),
        model.httpconfig.is_some(),
    ];
    for ((code, name), set) in PROVIDERS.iter().zip(present) {
        if set && *code != model.provider {
            d.push(
                format!("{path}/{name}"),
                format!("only valid when provider is {code}"),
            );
        }
    }

    match Backend::from_model(model) {
        Backend::S3(c) => {
            d.not_empty(&format!("{path}/s3config/bucket"), Some(&c.bucket));
        }
        Backend::Gcs(c) => {
            d.not_empty(&format!("{path}/gcsconfig/bucket"), Some(&c.bucket))
                .int_between(
                    &format!("{path}/gcsconfig/automatic_credentials"),
                    Some(c.automatic_credentials),
                    0,
                    1,
                );
        }
        Backend::AzureBlob(c) => {
            if c.container.is_empty() && c.sas_url.is_none() {
                d.push(
                    format!("{path}/azblobconfig/container"),
                    "container or sas_url is required",
                );
            }
        }
        Backend::Encrypted(c) => {
            if c.passphrase.as_deref().is_none_or(str::is_empty) {
                d.push(format!("{path}/cryptconfig/passphrase"), "is required");
            }
        }
        Backend::Sftp(c) => {
            d.not_empty(&format!("{path}/sftpconfig/endpoint"), Some(&c.endpoint))
                .not_empty(&format!("{path}/sftpconfig/username"), Some(&c.username))
                .int_between(
                    &format!("{path}/sftpconfig/equality_check_mode"),
                    Some(c.equality_check_mode),
                    0,
                    1,
                );
        }
        Backend::Http(c) => {
            d.not_empty(&format!("{path}/httpconfig/endpoint"), Some(&c.endpoint));
        }
        Backend::Local(_) => {}
    }
}

pub fn schema() -> AttributeType {
    let secret = |name| Attribute::optional(name, AttributeType::String).sensitive();
    let s = |name| Attribute::optional(name, AttributeType::String);
    let i = |name| Attribute::optional(name, AttributeType::Int);
    let b = |name| Attribute::optional(name, AttributeType::Bool);

    let os = Schema::v0()
        .with(i("read_buffer_size"))
        .with(i("write_buffer_size"));
    let s3 = Schema::v0()
        .with(s("bucket"))
        .with(s("region"))
        .with(s("access_key"))
        .with(secret("access_secret"))
        .with(s("role_arn"))
        .with(s("endpoint"))
        .with(s("storage_class"))
        .with(s("acl"))
        .with(s("key_prefix"))
        .with(i("upload_part_size"))
        .with(i("upload_concurrency"))
        .with(i("upload_part_max_time"))
        .with(i("download_part_size"))
        .with(i("download_concurrency"))
        .with(i("download_part_max_time"))
        .with(b("force_path_style"))
        .with(b("skip_tls_verify"));
    let gcs = Schema::v0()
        .with(s("bucket"))
        .with(secret("credentials"))
        .with(i("automatic_credentials"))
        .with(s("storage_class"))
        .with(s("acl"))
        .with(s("key_prefix"))
        .with(i("upload_part_size"))
        .with(i("upload_part_max_time"));
    let azblob = Schema::v0()
        .with(s("container"))
        .with(s("account_name"))
        .with(secret("account_key"))
        .with(secret("sas_url"))
        .with(s("endpoint"))
        .with(s("key_prefix"))
        .with(i("upload_part_size"))
        .with(i("upload_concurrency"))
        .with(i("download_part_size"))
        .with(i("download_concurrency"))
        .with(b("use_emulator"))
        .with(s("access_tier"));
    let crypt = Schema::v0()
        .with(secret("passphrase"))
        .with(i("read_buffer_size"))
        .with(i("write_buffer_size"));
    let sftp = Schema::v0()
        .with(s("endpoint"))
        .with(s("username"))
        .with(secret("password"))
        .with(secret("private_key"))
        .with(secret("key_passphrase"))
        .with(Attribute::optional("fingerprints", AttributeType::string_list()))
        .with(s("prefix"))
        .with(b("disable_concurrent_reads"))
        .with(i("buffer_size"))
        .with(i("equality_check_mode"));
    let http = Schema::v0()
        .with(s("endpoint"))
        .with(s("username"))
        .with(secret("password"))
        .with(secret("api_key"))
        .with(b("skip_tls_verify"))
        .with(i("equality_check_mode"));

    AttributeType::Object(
        Schema::v0()
            .with(
                Attribute::required("provider", AttributeType::Int).describe(
                    "0 local, 1 S3, 2 GCS, 3 Azure Blob, 4 encrypted local, 5 SFTP, 6 HTTP",
                ),
            )
            .with(Attribute::optional("osconfig", AttributeType::Object(os)))
            .with(Attribute::optional("s3config", AttributeType::Object(s3)))
            .with(Attribute::optional("gcsconfig", AttributeType::Object(gcs)))
            .with(Attribute::optional("azblobconfig", AttributeType::Object(azblob)))
            .with(Attribute::optional("cryptconfig", AttributeType::Object(crypt)))
            .with(Attribute::optional("sftpconfig", AttributeType::Object(sftp)))
            .with(Attribute::optional("httpconfig", AttributeType::Object(http))),
    )
}
