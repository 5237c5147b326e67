//! Remote session bootstrap
//!
//! Before a session is started the target alias, the editor and the managed
//! key pair are checked in that order. The first failing check ends the
//! attempt; nothing is retried.

mod connector;
mod editor;
mod keygen;

pub use connector::{Connector, ProcessConnector, SessionMode};
pub use editor::{CodeEditor, Editor};
pub use keygen::{KeyGenerator, SshKeygen};

use std::fs;
use std::path::Path;

use crate::config::{EditorPolicy, Settings, KEY_COMMENT, REMOTE_SSH_EXTENSION};
use crate::error::{Result, SshdError};
use crate::registry::HostRegistry;

/// Bootstrap stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckAlias,
    CheckExternalEditor,
    CheckKeyPair,
    Ready,
}

/// Runs the pre-connection checks for one alias.
pub struct SessionBootstrap<'a> {
    registry: &'a HostRegistry,
    settings: &'a Settings,
    editor: &'a dyn Editor,
    keygen: &'a dyn KeyGenerator,
    policy: EditorPolicy,
}

impl<'a> SessionBootstrap<'a> {
    pub fn new(
        registry: &'a HostRegistry,
        settings: &'a Settings,
        editor: &'a dyn Editor,
        keygen: &'a dyn KeyGenerator,
    ) -> Self {
        Self {
            registry,
            settings,
            editor,
            keygen,
            policy: settings.editor_policy(),
        }
    }

    /// Override the editor policy from settings for this attempt.
    pub fn with_editor_policy(mut self, policy: EditorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drive every stage until `Ready` or the first failure.
    pub fn run(&self, alias: &str) -> Result<Stage> {
        let mut stage = Stage::CheckAlias;
        while stage != Stage::Ready {
            stage = self.advance(stage, alias)?;
        }
        Ok(stage)
    }

    /// Execute `stage` and return the next one.
    pub fn advance(&self, stage: Stage, alias: &str) -> Result<Stage> {
        tracing::debug!(?stage, alias, "session bootstrap");
        match stage {
            Stage::CheckAlias => {
                self.check_alias(alias)?;
                Ok(Stage::CheckExternalEditor)
            }
            Stage::CheckExternalEditor => {
                self.check_editor()?;
                Ok(Stage::CheckKeyPair)
            }
            Stage::CheckKeyPair => {
                self.check_key_pair()?;
                Ok(Stage::Ready)
            }
            Stage::Ready => Ok(Stage::Ready),
        }
    }

    fn check_alias(&self, alias: &str) -> Result<()> {
        if self.registry.exists(alias) {
            Ok(())
        } else {
            Err(SshdError::InvalidAlias(alias.to_string()))
        }
    }

    fn check_editor(&self) -> Result<()> {
        if self.policy == EditorPolicy::Skip {
            return Ok(());
        }

        let problem = if !self.editor.is_available() {
            Some(format!("'{}' was not found on PATH", self.editor.name()))
        } else {
            match self.editor.list_extensions() {
                Ok(extensions)
                    if extensions
                        .iter()
                        .any(|id| id.eq_ignore_ascii_case(REMOTE_SSH_EXTENSION)) =>
                {
                    None
                }
                Ok(_) => Some(format!(
                    "extension '{}' is not installed in '{}'",
                    REMOTE_SSH_EXTENSION,
                    self.editor.name()
                )),
                Err(e) => Some(format!(
                    "could not list extensions of '{}': {e}",
                    self.editor.name()
                )),
            }
        };

        match (problem, self.policy) {
            (None, _) => Ok(()),
            (Some(problem), EditorPolicy::Require) => Err(SshdError::EditorNotFound(problem)),
            (Some(problem), _) => {
                tracing::warn!("{problem}; continuing without editor support");
                Ok(())
            }
        }
    }

    fn check_key_pair(&self) -> Result<()> {
        let private = self.settings.private_key_path();
        let public = self.settings.public_key_path();

        if private.exists() && public.exists() {
            tracing::info!(
                private = %private.display(),
                public = %public.display(),
                "RSA key pair found"
            );
            return Ok(());
        }

        tracing::warn!("RSA key pair missing, generating a new pair");
        discard(&private)?;
        discard(&public)?;

        let status = self.keygen.generate(&private, KEY_COMMENT)?;
        if status != 0 {
            return Err(SshdError::KeyPairGeneration(format!(
                "key generator exited with status {status}"
            )));
        }

        tracing::info!(
            private = %private.display(),
            public = %public.display(),
            "new RSA key pair generated"
        );
        Ok(())
    }
}

fn discard(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| SshdError::storage(path, e))?;
        tracing::debug!(path = %path.display(), "discarded half of an incomplete key pair");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct FakeEditor {
        available: bool,
        extensions: Vec<String>,
        listing_fails: bool,
    }

    impl FakeEditor {
        fn ready() -> Self {
            Self {
                available: true,
                extensions: vec![REMOTE_SSH_EXTENSION.to_string()],
                listing_fails: false,
            }
        }
    }

    impl Editor for FakeEditor {
        fn name(&self) -> &str {
            "fake-code"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn list_extensions(&self) -> Result<Vec<String>> {
            if self.listing_fails {
                return Err(SshdError::EditorNotFound("failed to run 'fake-code'".into()));
            }
            Ok(self.extensions.clone())
        }
    }

    /// Writes a key pair unless configured to fail.
    struct FakeKeygen {
        status: i32,
        calls: RefCell<Vec<(PathBuf, String)>>,
    }

    impl FakeKeygen {
        fn new(status: i32) -> Self {
            Self {
                status,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl KeyGenerator for FakeKeygen {
        fn generate(&self, output: &Path, comment: &str) -> Result<i32> {
            self.calls
                .borrow_mut()
                .push((output.to_path_buf(), comment.to_string()));
            if self.status == 0 {
                fs::write(output, "private").unwrap();
                fs::write(output.with_extension("pub"), "public").unwrap();
            }
            Ok(self.status)
        }
    }

    struct MissingKeygen;

    impl KeyGenerator for MissingKeygen {
        fn generate(&self, _output: &Path, _comment: &str) -> Result<i32> {
            Err(SshdError::KeyGenToolMissing)
        }
    }

    fn setup() -> (tempfile::TempDir, Settings, HostRegistry) {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::new(tmp.path());
        let mut registry = HostRegistry::open(&settings).unwrap();
        registry.add("10.0.0.5", "db1", false).unwrap();
        (tmp, settings, registry)
    }

    fn write_keys(settings: &Settings) {
        fs::write(settings.private_key_path(), "private").unwrap();
        fs::write(settings.public_key_path(), "public").unwrap();
    }

    #[test]
    fn test_ready_when_everything_present() {
        let (_tmp, settings, registry) = setup();
        write_keys(&settings);
        let editor = FakeEditor::ready();
        let keygen = FakeKeygen::new(0);

        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen);
        assert_eq!(bootstrap.run("db1").unwrap(), Stage::Ready);
        assert!(keygen.calls.borrow().is_empty());
    }

    #[test]
    fn test_stages_advance_in_order() {
        let (_tmp, settings, registry) = setup();
        write_keys(&settings);
        let editor = FakeEditor::ready();
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen);

        let mut stage = Stage::CheckAlias;
        let mut seen = vec![stage];
        while stage != Stage::Ready {
            stage = bootstrap.advance(stage, "db1").unwrap();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::CheckAlias,
                Stage::CheckExternalEditor,
                Stage::CheckKeyPair,
                Stage::Ready
            ]
        );
    }

    #[test]
    fn test_unknown_alias_stops_first() {
        let (_tmp, settings, registry) = setup();
        let editor = FakeEditor {
            available: false,
            extensions: Vec::new(),
            listing_fails: false,
        };
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Require);

        let err = bootstrap.run("nope").unwrap_err();
        assert!(matches!(err, SshdError::InvalidAlias(a) if a == "nope"));
        assert!(keygen.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_editor_under_require_fails() {
        let (_tmp, settings, registry) = setup();
        let editor = FakeEditor {
            available: false,
            extensions: Vec::new(),
            listing_fails: false,
        };
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Require);

        assert!(matches!(
            bootstrap.run("db1"),
            Err(SshdError::EditorNotFound(_))
        ));
        assert!(keygen.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_extension_under_require_fails() {
        let (_tmp, settings, registry) = setup();
        let editor = FakeEditor {
            available: true,
            extensions: vec!["ms-python.python".to_string()],
            listing_fails: false,
        };
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Require);

        assert!(matches!(
            bootstrap.run("db1"),
            Err(SshdError::EditorNotFound(msg)) if msg.contains(REMOTE_SSH_EXTENSION)
        ));
    }

    #[test]
    fn test_missing_editor_under_warn_continues() {
        let (_tmp, settings, registry) = setup();
        write_keys(&settings);
        let editor = FakeEditor {
            available: false,
            extensions: Vec::new(),
            listing_fails: false,
        };
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Warn);

        assert_eq!(bootstrap.run("db1").unwrap(), Stage::Ready);
    }

    #[test]
    fn test_failed_extension_listing_follows_policy() {
        let (_tmp, settings, registry) = setup();
        write_keys(&settings);
        let editor = FakeEditor {
            available: true,
            extensions: Vec::new(),
            listing_fails: true,
        };
        let keygen = FakeKeygen::new(0);

        let warn = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Warn);
        assert_eq!(warn.run("db1").unwrap(), Stage::Ready);

        let require = SessionBootstrap::new(&registry, &settings, &editor, &keygen)
            .with_editor_policy(EditorPolicy::Require);
        assert!(matches!(
            require.run("db1"),
            Err(SshdError::EditorNotFound(msg)) if msg.contains("could not list extensions")
        ));
    }

    #[test]
    fn test_missing_keys_are_generated() {
        let (_tmp, settings, registry) = setup();
        let editor = FakeEditor::ready();
        let keygen = FakeKeygen::new(0);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen);

        assert_eq!(bootstrap.run("db1").unwrap(), Stage::Ready);

        let calls = keygen.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, settings.private_key_path());
        assert_eq!(calls[0].1, KEY_COMMENT);
        assert!(settings.public_key_path().exists());
    }

    #[test]
    fn test_half_pair_is_discarded_before_regeneration() {
        let (_tmp, settings, registry) = setup();
        fs::write(settings.public_key_path(), "stale public").unwrap();
        let editor = FakeEditor::ready();
        let keygen = FakeKeygen::new(1);
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &keygen);

        assert!(matches!(
            bootstrap.run("db1"),
            Err(SshdError::KeyPairGeneration(_))
        ));
        assert!(!settings.public_key_path().exists());
        assert_eq!(keygen.calls.borrow().len(), 1);
    }

    #[test]
    fn test_missing_keygen_tool() {
        let (_tmp, settings, registry) = setup();
        let editor = FakeEditor::ready();
        let bootstrap = SessionBootstrap::new(&registry, &settings, &editor, &MissingKeygen);

        assert!(matches!(
            bootstrap.run("db1"),
            Err(SshdError::KeyGenToolMissing)
        ));
    }
}
