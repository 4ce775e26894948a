//! `sftpgo_event_action`: things the event manager can run.
//!
//! `type` picks exactly one entry of `options`. The server echoes every
//! entry whether it applies or not, so the active one is lifted into
//! [`ActionConfig`] on the way in and out and the rest is dropped.

use super::require_id;
use super::shared::{self, deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::{
    ActionOptions, CmdConfig, EmailConfig, EventAction, FsActionConfig, FsCompress, HttpConfig,
    HttpPart, IdpConfig, KeyValue, PwdExpirationConfig, RetentionConfig, Secret,
    UserInactivityConfig,
};

/// Valid action types; 10 is unused by the server.
pub const ACTION_TYPES: &[i64] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 13, 14, 15];

/// Action types that carry a sub-config, and its key in `options`.
const OPTION_BLOCKS: [(i64, &str); 8] = [
    (1, "http_config"),
    (2, "cmd_config"),
    (3, "email_config"),
    (8, "retention_config"),
    (9, "fs_config"),
    (11, "pwd_expiration_config"),
    (13, "idp_config"),
    (14, "user_inactivity_config"),
];

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventActionModel {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub action_type: i64,
    pub options: Option<ActionOptionsModel>,
    pub id: Option<i64>,
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionOptionsModel {
    pub http_config: Option<HttpActionConfig>,
    pub cmd_config: Option<CmdConfig>,
    pub email_config: Option<EmailConfig>,
    pub retention_config: Option<RetentionConfig>,
    pub fs_config: Option<FsActionModel>,
    pub pwd_expiration_config: Option<PwdExpirationConfig>,
    pub user_inactivity_config: Option<UserInactivityConfig>,
    pub idp_config: Option<IdpConfig>,
}

/// HTTP notification with the password in plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpActionConfig {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub headers: Vec<KeyValue>,
    pub timeout: i64,
    pub skip_tls_verify: bool,
    pub method: String,
    pub query_parameters: Vec<KeyValue>,
    pub body: String,
    pub parts: Vec<HttpPart>,
}

/// Filesystem action as configured: one list per operation, only the
/// one matching `type` is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsActionModel {
    #[serde(rename = "type")]
    pub fs_type: i64,
    pub renames: Option<Vec<KeyValue>>,
    pub deletes: Option<Vec<String>>,
    pub mkdirs: Option<Vec<String>>,
    pub exist: Option<Vec<String>>,
    pub compress: Option<FsCompress>,
    pub copy: Option<Vec<KeyValue>>,
}

// ============================================================================
// Discriminated forms
// ============================================================================

/// Filesystem operation selected by `fs_config.type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsAction {
    Rename(Vec<KeyValue>),
    Delete(Vec<String>),
    Mkdirs(Vec<String>),
    Exist(Vec<String>),
    Compress(FsCompress),
    Copy(Vec<KeyValue>),
}

impl FsAction {
    pub fn from_model(model: &FsActionModel) -> Option<Self> {
        let action = match model.fs_type {
            1 => Self::Rename(model.renames.clone().unwrap_or_default()),
            2 => Self::Delete(model.deletes.clone().unwrap_or_default()),
            3 => Self::Mkdirs(model.mkdirs.clone().unwrap_or_default()),
            4 => Self::Exist(model.exist.clone().unwrap_or_default()),
            5 => Self::Compress(model.compress.clone().unwrap_or_default()),
            6 => Self::Copy(model.copy.clone().unwrap_or_default()),
            _ => return None,
        };
        Some(action)
    }

    pub fn from_wire(config: FsActionConfig) -> Option<Self> {
        let action = match config.fs_type {
            1 => Self::Rename(config.renames),
            2 => Self::Delete(config.deletes),
            3 => Self::Mkdirs(config.mkdirs),
            4 => Self::Exist(config.exist),
            5 => Self::Compress(config.compress),
            6 => Self::Copy(config.copy),
            _ => return None,
        };
        Some(action)
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Rename(_) => 1,
            Self::Delete(_) => 2,
            Self::Mkdirs(_) => 3,
            Self::Exist(_) => 4,
            Self::Compress(_) => 5,
            Self::Copy(_) => 6,
        }
    }

    pub fn to_wire(&self) -> FsActionConfig {
        let mut config = FsActionConfig {
            fs_type: self.code(),
            ..FsActionConfig::default()
        };
        match self {
            Self::Rename(v) => config.renames = v.clone(),
            Self::Delete(v) => config.deletes = v.clone(),
            Self::Mkdirs(v) => config.mkdirs = v.clone(),
            Self::Exist(v) => config.exist = v.clone(),
            Self::Compress(c) => config.compress = c.clone(),
            Self::Copy(v) => config.copy = v.clone(),
        }
        config
    }

    pub fn into_model(self) -> FsActionModel {
        let mut model = FsActionModel {
            fs_type: self.code(),
            ..FsActionModel::default()
        };
        match self {
            Self::Rename(v) => model.renames = Some(v),
            Self::Delete(v) => model.deletes = Some(v),
            Self::Mkdirs(v) => model.mkdirs = Some(v),
            Self::Exist(v) => model.exist = Some(v),
            Self::Compress(c) => model.compress = Some(c),
            Self::Copy(v) => model.copy = Some(v),
        }
        model
    }
}

/// What an action does, selected by its `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionConfig {
    Http(HttpActionConfig),
    Command(CmdConfig),
    Email(EmailConfig),
    Backup,
    UserQuotaReset,
    FolderQuotaReset,
    TransferQuotaReset,
    DataRetention(RetentionConfig),
    Filesystem(FsAction),
    PasswordExpiration(PwdExpirationConfig),
    UserExpiration,
    IdentityProvider(IdpConfig),
    UserInactivity(UserInactivityConfig),
    RotateLog,
}

impl ActionConfig {
    /// `None` for unknown action or filesystem types.
    pub fn from_model(action_type: i64, options: Option<&ActionOptionsModel>) -> Option<Self> {
        let o = options.cloned().unwrap_or_default();
        let config = match action_type {
            1 => Self::Http(o.http_config.unwrap_or_default()),
            2 => Self::Command(o.cmd_config.unwrap_or_default()),
            3 => Self::Email(o.email_config.unwrap_or_default()),
            4 => Self::Backup,
            5 => Self::UserQuotaReset,
            6 => Self::FolderQuotaReset,
            7 => Self::TransferQuotaReset,
            8 => Self::DataRetention(o.retention_config.unwrap_or_default()),
            9 => Self::Filesystem(FsAction::from_model(&o.fs_config.unwrap_or_default())?),
            11 => Self::PasswordExpiration(o.pwd_expiration_config.unwrap_or_default()),
            12 => Self::UserExpiration,
            13 => Self::IdentityProvider(o.idp_config.unwrap_or_default()),
            14 => Self::UserInactivity(o.user_inactivity_config.unwrap_or_default()),
            15 => Self::RotateLog,
            _ => return None,
        };
        Some(config)
    }

    pub fn from_wire(action_type: i64, options: ActionOptions) -> Option<Self> {
        let config = match action_type {
            1 => {
                let c = options.http_config.unwrap_or_default();
                Self::Http(HttpActionConfig {
                    password: c.password.filter(|s| !s.is_empty()).map(|s| s.payload),
                    endpoint: c.endpoint,
                    username: c.username,
                    headers: c.headers,
                    timeout: c.timeout,
                    skip_tls_verify: c.skip_tls_verify,
                    method: c.method,
                    query_parameters: c.query_parameters,
                    body: c.body,
                    parts: c.parts,
                })
            }
            2 => Self::Command(options.cmd_config.unwrap_or_default()),
            3 => Self::Email(options.email_config.unwrap_or_default()),
            4 => Self::Backup,
            5 => Self::UserQuotaReset,
            6 => Self::FolderQuotaReset,
            7 => Self::TransferQuotaReset,
            8 => Self::DataRetention(options.retention_config.unwrap_or_default()),
            9 => Self::Filesystem(FsAction::from_wire(options.fs_config.unwrap_or_default())?),
            11 => Self::PasswordExpiration(options.pwd_expiration_config.unwrap_or_default()),
            12 => Self::UserExpiration,
            13 => Self::IdentityProvider(options.idp_config.unwrap_or_default()),
            14 => Self::UserInactivity(options.user_inactivity_config.unwrap_or_default()),
            15 => Self::RotateLog,
            _ => return None,
        };
        Some(config)
    }

    /// Wire options holding only this action's entry.
    pub fn to_wire(&self) -> ActionOptions {
        let mut options = ActionOptions::default();
        match self {
            Self::Http(c) => {
                options.http_config = Some(HttpConfig {
                    endpoint: c.endpoint.clone(),
                    username: c.username.clone(),
                    password: c.password.as_deref().map(Secret::plain),
                    headers: c.headers.clone(),
                    timeout: c.timeout,
                    skip_tls_verify: c.skip_tls_verify,
                    method: c.method.clone(),
                    query_parameters: c.query_parameters.clone(),
                    body: c.body.clone(),
                    parts: c.parts.clone(),
                });
            }
            Self::Command(c) => options.cmd_config = Some(c.clone()),
            Self::Email(c) => options.email_config = Some(c.clone()),
            Self::DataRetention(c) => options.retention_config = Some(c.clone()),
            Self::Filesystem(a) => options.fs_config = Some(a.to_wire()),
            Self::PasswordExpiration(c) => options.pwd_expiration_config = Some(c.clone()),
            Self::IdentityProvider(c) => options.idp_config = Some(c.clone()),
            Self::UserInactivity(c) => options.user_inactivity_config = Some(c.clone()),
            Self::Backup
            | Self::UserQuotaReset
            | Self::FolderQuotaReset
            | Self::TransferQuotaReset
            | Self::UserExpiration
            | Self::RotateLog => {}
        }
        options
    }

    pub fn into_options(self) -> ActionOptionsModel {
        let mut options = ActionOptionsModel::default();
        match self {
            Self::Http(c) => options.http_config = Some(c),
            Self::Command(c) => options.cmd_config = Some(c),
            Self::Email(c) => options.email_config = Some(c),
            Self::DataRetention(c) => options.retention_config = Some(c),
            Self::Filesystem(a) => options.fs_config = Some(a.into_model()),
            Self::PasswordExpiration(c) => options.pwd_expiration_config = Some(c),
            Self::IdentityProvider(c) => options.idp_config = Some(c),
            Self::UserInactivity(c) => options.user_inactivity_config = Some(c),
            Self::Backup
            | Self::UserQuotaReset
            | Self::FolderQuotaReset
            | Self::TransferQuotaReset
            | Self::UserExpiration
            | Self::RotateLog => {}
        }
        options
    }
}

// ============================================================================
// Adapter
// ============================================================================

pub struct EventActionResource;

fn encode(model: &EventActionModel) -> EventAction {
    EventAction {
        name: model.name.clone(),
        description: model.description.clone().unwrap_or_default(),
        action_type: model.action_type,
        options: ActionConfig::from_model(model.action_type, model.options.as_ref())
            .map(|c| c.to_wire())
            .unwrap_or_default(),
        ..EventAction::default()
    }
}

pub fn decode(action: EventAction) -> EventActionModel {
    let options = ActionConfig::from_wire(action.action_type, action.options)
        .map(ActionConfig::into_options)
        .unwrap_or_default();
    EventActionModel {
        name: action.name,
        description: Some(action.description),
        action_type: action.action_type,
        options: Some(options),
        id: Some(action.id),
        rules: Some(action.rules),
    }
}

fn options_schema() -> AttributeType {
    let s = |name| Attribute::optional(name, AttributeType::String);
    let i = |name| Attribute::optional(name, AttributeType::Int);
    let b = |name| Attribute::optional(name, AttributeType::Bool);
    let list = |name| Attribute::optional(name, AttributeType::string_list());
    let pairs = |name| Attribute::optional(name, shared::key_value_list());

    let part = Schema::v0()
        .with(Attribute::required("name", AttributeType::String))
        .with(s("filepath"))
        .with(pairs("headers"))
        .with(s("body"));
    let http = Schema::v0()
        .with(Attribute::required("endpoint", AttributeType::String))
        .with(s("username"))
        .with(s("password").sensitive())
        .with(pairs("headers"))
        .with(i("timeout").describe("Seconds, 1 to 180"))
        .with(b("skip_tls_verify"))
        .with(Attribute::required("method", AttributeType::String))
        .with(pairs("query_parameters"))
        .with(s("body"))
        .with(Attribute::optional("parts", AttributeType::ObjectList(part)));
    let cmd = Schema::v0()
        .with(Attribute::required("cmd", AttributeType::String))
        .with(list("args"))
        .with(i("timeout").describe("Seconds, 1 to 120"))
        .with(pairs("env_vars"));
    let email = Schema::v0()
        .with(Attribute::required("recipients", AttributeType::string_list()))
        .with(list("bcc"))
        .with(Attribute::required("subject", AttributeType::String))
        .with(s("body"))
        .with(i("content_type").describe("0 text/plain, 1 text/html"))
        .with(list("attachments"));
    let folder = Schema::v0()
        .with(Attribute::required("path", AttributeType::String))
        .with(i("retention").describe("Hours, 0 excludes the path"))
        .with(b("delete_empty_dirs"));
    let retention = Schema::v0().with(Attribute::required(
        "folders",
        AttributeType::ObjectList(folder),
    ));
    let compress = Schema::v0().with(s("name")).with(list("paths"));
    let fs = Schema::v0()
        .with(
            Attribute::required("type", AttributeType::Int)
                .describe("1 rename, 2 delete, 3 mkdirs, 4 exist, 5 compress, 6 copy"),
        )
        .with(pairs("renames"))
        .with(list("deletes"))
        .with(list("mkdirs"))
        .with(list("exist"))
        .with(Attribute::optional("compress", AttributeType::Object(compress)))
        .with(pairs("copy"));
    let pwd_expiration = Schema::v0().with(i("threshold"));
    let inactivity = Schema::v0()
        .with(i("disable_threshold"))
        .with(i("delete_threshold"));
    let idp = Schema::v0()
        .with(i("mode"))
        .with(s("template_user"))
        .with(s("template_admin"));

    AttributeType::Object(
        Schema::v0()
            .with(Attribute::optional("http_config", AttributeType::Object(http)))
            .with(Attribute::optional("cmd_config", AttributeType::Object(cmd)))
            .with(Attribute::optional("email_config", AttributeType::Object(email)))
            .with(Attribute::optional("retention_config", AttributeType::Object(retention)))
            .with(Attribute::optional("fs_config", AttributeType::Object(fs)))
            .with(Attribute::optional(
                "pwd_expiration_config",
                AttributeType::Object(pwd_expiration),
            ))
            .with(Attribute::optional(
                "user_inactivity_config",
                AttributeType::Object(inactivity),
            ))
            .with(Attribute::optional("idp_config", AttributeType::Object(idp))),
    )
}

fn check_pairs(d: &mut Diagnostics, path: &str, pairs: &[KeyValue]) {
    for (i, pair) in pairs.iter().enumerate() {
        d.not_empty(&format!("{path}/{i}/key"), Some(&pair.key));
    }
}

fn check_absolute(d: &mut Diagnostics, path: &str, value: &str) {
    if !value.starts_with('/') {
        d.push(path, "must be an absolute path");
    }
}

fn check_http(d: &mut Diagnostics, c: &HttpActionConfig) {
    let p = "/options/http_config";
    if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
        d.push(format!("{p}/endpoint"), "must be an http or https URL");
    }
    d.str_one_of(&format!("{p}/method"), Some(&c.method), HTTP_METHODS)
        .int_between(&format!("{p}/timeout"), Some(c.timeout), 1, 180);
    check_pairs(d, &format!("{p}/headers"), &c.headers);
    check_pairs(d, &format!("{p}/query_parameters"), &c.query_parameters);
    if !c.body.is_empty() && !c.parts.is_empty() {
        d.push(format!("{p}/parts"), "cannot be combined with body");
    }
    for (i, part) in c.parts.iter().enumerate() {
        d.not_empty(&format!("{p}/parts/{i}/name"), Some(&part.name));
    }
}

fn check_fs(d: &mut Diagnostics, m: &FsActionModel) {
    let p = "/options/fs_config";
    d.int_between(&format!("{p}/type"), Some(m.fs_type), 1, 6);
    let lists = [
        (1, "renames", m.renames.as_ref().map(Vec::len)),
        (2, "deletes", m.deletes.as_ref().map(Vec::len)),
        (3, "mkdirs", m.mkdirs.as_ref().map(Vec::len)),
        (4, "exist", m.exist.as_ref().map(Vec::len)),
        (5, "compress", m.compress.as_ref().map(|c| c.paths.len())),
        (6, "copy", m.copy.as_ref().map(Vec::len)),
    ];
    for (code, name, len) in lists {
        let path = format!("{p}/{name}");
        match len {
            Some(_) if code != m.fs_type => {
                d.push(path, format!("only valid when type is {code}"));
            }
            None | Some(0) if code == m.fs_type => {
                d.push(path, format!("must not be empty when type is {code}"));
            }
            _ => {}
        }
    }
    match FsAction::from_model(m) {
        Some(FsAction::Rename(pairs)) => check_pairs(d, &format!("{p}/renames"), &pairs),
        Some(FsAction::Copy(pairs)) => check_pairs(d, &format!("{p}/copy"), &pairs),
        Some(FsAction::Compress(c)) => {
            d.not_empty(&format!("{p}/compress/name"), Some(&c.name));
        }
        _ => {}
    }
}

fn check_config(d: &mut Diagnostics, config: &ActionConfig) {
    match config {
        ActionConfig::Http(c) => check_http(d, c),
        ActionConfig::Command(c) => {
            let p = "/options/cmd_config";
            check_absolute(d, &format!("{p}/cmd"), &c.cmd);
            d.int_between(&format!("{p}/timeout"), Some(c.timeout), 1, 120);
            check_pairs(d, &format!("{p}/env_vars"), &c.env_vars);
        }
        ActionConfig::Email(c) => {
            let p = "/options/email_config";
            d.ensure(
                !c.recipients.is_empty(),
                &format!("{p}/recipients"),
                "must not be empty",
            )
            .not_empty(&format!("{p}/subject"), Some(&c.subject))
            .int_between(&format!("{p}/content_type"), Some(c.content_type), 0, 1);
        }
        ActionConfig::DataRetention(c) => {
            let p = "/options/retention_config/folders";
            d.ensure(!c.folders.is_empty(), p, "must not be empty");
            for (i, folder) in c.folders.iter().enumerate() {
                check_absolute(d, &format!("{p}/{i}/path"), &folder.path);
                d.int_at_least(&format!("{p}/{i}/retention"), Some(folder.retention), 0);
            }
        }
        ActionConfig::PasswordExpiration(c) => {
            d.int_at_least(
                "/options/pwd_expiration_config/threshold",
                Some(c.threshold),
                1,
            );
        }
        ActionConfig::UserInactivity(c) => {
            let p = "/options/user_inactivity_config";
            d.int_at_least(&format!("{p}/disable_threshold"), Some(c.disable_threshold), 0)
                .int_at_least(&format!("{p}/delete_threshold"), Some(c.delete_threshold), 0)
                .ensure(
                    c.disable_threshold > 0 || c.delete_threshold > 0,
                    p,
                    "set disable_threshold or delete_threshold",
                );
        }
        ActionConfig::IdentityProvider(c) => {
            d.int_between("/options/idp_config/mode", Some(c.mode), 0, 1);
        }
        ActionConfig::Filesystem(_)
        | ActionConfig::Backup
        | ActionConfig::UserQuotaReset
        | ActionConfig::FolderQuotaReset
        | ActionConfig::TransferQuotaReset
        | ActionConfig::UserExpiration
        | ActionConfig::RotateLog => {}
    }
}

impl Lifecycle for EventActionResource {
    type Client = Client;
    type Model = EventActionModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_event_action"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String).force_new())
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::required("type", AttributeType::Int).describe(
                "1 HTTP, 2 command, 3 email, 4 backup, 5 user quota reset, \
                 6 folder quota reset, 7 transfer quota reset, 8 data retention, \
                 9 filesystem, 11 password expiration, 12 user expiration, \
                 13 identity provider, 14 user inactivity, 15 rotate log",
            ))
            .with(Attribute::optional_computed("options", options_schema()))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(
                Attribute::computed("rules", AttributeType::string_list())
                    .describe("Event rules using the action"),
            )
    }

    fn identity(&self, model: &EventActionModel) -> String {
        model.name.clone()
    }

    fn validate(&self, model: &EventActionModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some(&model.name))
            .int_one_of("/type", Some(model.action_type), ACTION_TYPES);

        let options = model.options.clone().unwrap_or_default();
        let present = [
            options.http_config.is_some(),
            options.cmd_config.is_some(),
            options.email_config.is_some(),
            options.retention_config.is_some(),
            options.fs_config.is_some(),
            options.pwd_expiration_config.is_some(),
            options.idp_config.is_some(),
            options.user_inactivity_config.is_some(),
        ];
        let mut missing = false;
        for ((code, name), set) in OPTION_BLOCKS.iter().zip(present) {
            let path = format!("/options/{name}");
            if set && *code != model.action_type {
                d.push(path, format!("only valid when type is {code}"));
            } else if !set && *code == model.action_type {
                d.push(path, format!("is required when type is {code}"));
                missing = true;
            }
        }
        if missing {
            return d.into_vec();
        }

        if let Some(fs) = options.fs_config.as_ref().filter(|_| model.action_type == 9) {
            check_fs(&mut d, fs);
        }
        if let Some(config) = ActionConfig::from_model(model.action_type, Some(&options)) {
            check_config(&mut d, &config);
        }
        d.into_vec()
    }

    fn secret_paths(&self, model: &EventActionModel) -> Vec<String> {
        if model.action_type == 1 {
            vec!["/options/http_config/password".to_string()]
        } else {
            Vec::new()
        }
    }

    fn create(&self, client: &Client, plan: &EventActionModel) -> Result<EventActionModel> {
        log::debug!("Creating event action {}", plan.name);
        client.create(&encode(plan)).map_err(remote)?;
        let action: EventAction = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(action), plan)
    }

    fn read(&self, client: &Client, state: &EventActionModel) -> Result<Option<EventActionModel>> {
        match client.find::<EventAction>(&state.name).map_err(remote)? {
            Some(action) => Ok(Some(self.preserve_secrets(decode(action), state)?)),
            None => Ok(None),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &EventActionModel,
        _prior: &EventActionModel,
    ) -> Result<EventActionModel> {
        log::debug!("Updating event action {}", plan.name);
        client.update(&encode(plan)).map_err(remote)?;
        let action: EventAction = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(action), plan)
    }

    fn delete(&self, client: &Client, state: &EventActionModel) -> Result<()> {
        deleted(
            client.delete::<EventAction>(&state.name),
            &format!("event action {}", state.name),
        )
    }

    fn import(&self, id: &str) -> Result<EventActionModel> {
        Ok(EventActionModel {
            name: require_id(id, "event action name")?.to_string(),
            ..EventActionModel::default()
        })
    }
}
