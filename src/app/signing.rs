//! Signing credential collection
//!
//! Which fields a build needs depends on `(platform, mode)`:
//!
//! | platform | mode    | fields                                              |
//! |----------|---------|-----------------------------------------------------|
//! | android  | debug   | none                                                |
//! | android  | release | keystore, keystore password, key alias, key password |
//! | ios      | any     | certificate, certificate password, provisioning profile |
//!
//! Flags pre-fill fields; anything still missing is prompted for. A bundle is
//! only returned once every required field is non-empty, and signing files are
//! read only after that point.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::models::{BuildMode, Platform};
use crate::app::prompt::Prompter;
use crate::errors::{CredentialInputError, FilesystemError, Result};

/// What a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Filesystem path, `~` expanded
    Path,
    /// Free text, echoed while typing
    Text,
    /// Secret, not echoed
    Password,
}

/// One signing input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Flag-style key, e.g. `keystore-password`
    pub key: &'static str,
    /// Prompt label
    pub label: &'static str,
    pub kind: FieldKind,
}

const ANDROID_RELEASE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "keystore",
        label: "Keystore File:",
        kind: FieldKind::Path,
    },
    FieldSpec {
        key: "keystore-password",
        label: "Keystore Password:",
        kind: FieldKind::Password,
    },
    FieldSpec {
        key: "key-alias",
        label: "Key Alias:",
        kind: FieldKind::Text,
    },
    FieldSpec {
        key: "key-password",
        label: "Key Password:",
        kind: FieldKind::Password,
    },
];

const IOS_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "cert",
        label: "Certificate File:",
        kind: FieldKind::Path,
    },
    FieldSpec {
        key: "cert-password",
        label: "Certificate Password:",
        kind: FieldKind::Password,
    },
    FieldSpec {
        key: "provisioning-profile",
        label: "Provisioning Profile:",
        kind: FieldKind::Path,
    },
];

/// Fields required for a platform and mode
pub fn required_fields(platform: Platform, mode: BuildMode) -> &'static [FieldSpec] {
    match (platform, mode) {
        (Platform::Android, BuildMode::Debug) => &[],
        (Platform::Android, BuildMode::Release) => ANDROID_RELEASE_FIELDS,
        (Platform::Ios, _) => IOS_FIELDS,
    }
}

/// Whether a build needs any signing input at all
pub fn requires_credentials(platform: Platform, mode: BuildMode) -> bool {
    !required_fields(platform, mode).is_empty()
}

/// Signing values given on the command line
///
/// `password` is shared: keystore password on Android, certificate password
/// on iOS.
#[derive(Debug, Clone, Default)]
pub struct SigningFlags {
    pub keystore: Option<String>,
    pub password: Option<String>,
    pub key_alias: Option<String>,
    pub key_password: Option<String>,
    pub cert: Option<String>,
    pub provisioning_profile: Option<String>,
}

impl SigningFlags {
    fn value_for(&self, key: &str) -> Option<&str> {
        let value = match key {
            "keystore" => self.keystore.as_deref(),
            "keystore-password" | "cert-password" => self.password.as_deref(),
            "key-alias" => self.key_alias.as_deref(),
            "key-password" => self.key_password.as_deref(),
            "cert" => self.cert.as_deref(),
            "provisioning-profile" => self.provisioning_profile.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Complete signing material for one build
#[derive(Clone, PartialEq, Eq)]
pub enum SigningBundle {
    /// Android debug builds are signed by the service
    Unsigned,
    AndroidKeystore {
        keystore_path: PathBuf,
        keystore_password: String,
        key_alias: String,
        key_password: String,
    },
    IosCertificate {
        cert_path: PathBuf,
        cert_password: String,
        provisioning_profile_path: PathBuf,
    },
}

impl std::fmt::Debug for SigningBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningBundle::Unsigned => f.write_str("Unsigned"),
            SigningBundle::AndroidKeystore {
                keystore_path,
                key_alias,
                ..
            } => f
                .debug_struct("AndroidKeystore")
                .field("keystore_path", keystore_path)
                .field("key_alias", key_alias)
                .finish_non_exhaustive(),
            SigningBundle::IosCertificate {
                cert_path,
                provisioning_profile_path,
                ..
            } => f
                .debug_struct("IosCertificate")
                .field("cert_path", cert_path)
                .field("provisioning_profile_path", provisioning_profile_path)
                .finish_non_exhaustive(),
        }
    }
}

/// A signing file read into memory for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningFile {
    /// Multipart field name
    pub field: &'static str,
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Form fields and files derived from a [`SigningBundle`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningMaterial {
    pub fields: Vec<(&'static str, String)>,
    pub files: Vec<SigningFile>,
}

impl SigningBundle {
    /// Read the bundle's files, producing upload-ready material
    pub async fn open(&self) -> Result<SigningMaterial> {
        match self {
            SigningBundle::Unsigned => Ok(SigningMaterial::default()),
            SigningBundle::AndroidKeystore {
                keystore_path,
                keystore_password,
                key_alias,
                key_password,
            } => Ok(SigningMaterial {
                fields: vec![
                    ("keystore_password", keystore_password.clone()),
                    ("key_alias", key_alias.clone()),
                    ("key_password", key_password.clone()),
                ],
                files: vec![read_signing_file("keystore_file", keystore_path).await?],
            }),
            SigningBundle::IosCertificate {
                cert_path,
                cert_password,
                provisioning_profile_path,
            } => Ok(SigningMaterial {
                fields: vec![("cert_password", cert_password.clone())],
                files: vec![
                    read_signing_file("cert_file", cert_path).await?,
                    read_signing_file("provisioning_profile_file", provisioning_profile_path)
                        .await?,
                ],
            }),
        }
    }
}

async fn read_signing_file(field: &'static str, path: &Path) -> Result<SigningFile> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|source| FilesystemError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| field.to_string());

    debug!("Read {} ({} bytes) for {}", path.display(), contents.len(), field);
    Ok(SigningFile {
        field,
        file_name,
        contents,
    })
}

/// Expand a leading `~` to the home directory
pub fn expand_home(raw: &str) -> std::result::Result<PathBuf, CredentialInputError> {
    expand_home_with(raw, dirs::home_dir())
}

fn expand_home_with(
    raw: &str,
    home: Option<PathBuf>,
) -> std::result::Result<PathBuf, CredentialInputError> {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };

    match rest {
        Some(rest) => {
            let home = home.ok_or_else(|| CredentialInputError::HomeDirectoryUnavailable {
                path: raw.to_string(),
            })?;
            Ok(if rest.is_empty() { home } else { home.join(rest) })
        }
        None => Ok(PathBuf::from(raw)),
    }
}

/// Gather the signing bundle for a build
///
/// Flags are used as-is; every other required field is prompted for. An empty
/// answer fails the collection, so a partial bundle is never returned.
pub fn collect_credentials(
    platform: Platform,
    mode: BuildMode,
    flags: &SigningFlags,
    prompter: &mut dyn Prompter,
) -> Result<SigningBundle> {
    let fields = required_fields(platform, mode);
    let mut values = Vec::with_capacity(fields.len());

    for spec in fields {
        let value = match flags.value_for(spec.key) {
            Some(v) => v.to_string(),
            None => prompter
                .ask(spec.label, spec.kind == FieldKind::Password)
                .map_err(CredentialInputError::Prompt)?,
        };

        // Passwords may legitimately contain surrounding spaces
        let value = if spec.kind == FieldKind::Password {
            value
        } else {
            value.trim().to_string()
        };

        if value.is_empty() {
            return Err(CredentialInputError::MissingField { field: spec.label }.into());
        }
        values.push(value);
    }

    let bundle = match (platform, mode) {
        (Platform::Android, BuildMode::Debug) => SigningBundle::Unsigned,
        (Platform::Android, BuildMode::Release) => {
            let [keystore, keystore_password, key_alias, key_password]: [String; 4] = values
                .try_into()
                .map_err(|_| CredentialInputError::MissingField {
                    field: "Keystore File:",
                })?;
            SigningBundle::AndroidKeystore {
                keystore_path: expand_home(&keystore)?,
                keystore_password,
                key_alias,
                key_password,
            }
        }
        (Platform::Ios, _) => {
            let [cert, cert_password, profile]: [String; 3] =
                values
                    .try_into()
                    .map_err(|_| CredentialInputError::MissingField {
                        field: "Certificate File:",
                    })?;
            SigningBundle::IosCertificate {
                cert_path: expand_home(&cert)?,
                cert_password,
                provisioning_profile_path: expand_home(&profile)?,
            }
        }
    };

    debug!("Collected signing bundle for {} {}", platform, mode);
    Ok(bundle)
}
