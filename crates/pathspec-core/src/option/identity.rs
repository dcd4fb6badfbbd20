//! Owner and group names, resolved through the user/group databases.
//!
//! Only unix platforms can resolve ownership; elsewhere the check is
//! reported as unsupported and skipped.

use std::path::Path;

use super::{OptionDefinition, OptionKey};
use crate::error::FetchError;
use crate::value::{Value, ValueKind};

#[derive(Debug, Clone, Copy)]
pub(super) enum Identity {
    Owner,
    Group,
}

impl Identity {
    fn key(self) -> OptionKey {
        match self {
            Identity::Owner => OptionKey::Owner,
            Identity::Group => OptionKey::Group,
        }
    }
}

#[derive(Debug)]
pub(super) struct IdentityName(Identity);

pub(super) static OWNER: IdentityName = IdentityName(Identity::Owner);
pub(super) static GROUP: IdentityName = IdentityName(Identity::Group);

impl OptionDefinition for IdentityName {
    fn key(&self) -> OptionKey {
        self.0.key()
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Text]
    }

    fn fetch_actual(&self, path: &Path, follow_links: bool) -> Result<Value, FetchError> {
        resolve(self.0, path, follow_links).map(Value::Text)
    }
}

#[cfg(unix)]
fn resolve(which: Identity, path: &Path, follow_links: bool) -> Result<String, FetchError> {
    use nix::unistd::{Gid, Group, Uid, User};
    use std::os::unix::fs::MetadataExt;

    let meta = crate::fs::metadata(path, follow_links)?;
    let lookup_failed = |e: nix::Error| lookup_error(which, path, e);

    // Ids without a database entry are reported numerically.
    match which {
        Identity::Owner => Ok(User::from_uid(Uid::from_raw(meta.uid()))
            .map_err(lookup_failed)?
            .map_or_else(|| meta.uid().to_string(), |u| u.name)),
        Identity::Group => Ok(Group::from_gid(Gid::from_raw(meta.gid()))
            .map_err(lookup_failed)?
            .map_or_else(|| meta.gid().to_string(), |g| g.name)),
    }
}

#[cfg(unix)]
fn lookup_error(which: Identity, path: &Path, e: impl std::fmt::Display) -> FetchError {
    FetchError::Failed(format!(
        "cannot resolve {} of '{}': {e}",
        which.key(),
        path.display()
    ))
}

#[cfg(not(unix))]
fn resolve(_which: Identity, _path: &Path, _follow_links: bool) -> Result<String, FetchError> {
    Err(FetchError::Unsupported("this platform".into()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::option::{check, CheckOutcome};
    use crate::predicate;

    fn current_user_name() -> String {
        let uid = nix::unistd::geteuid();
        nix::unistd::User::from_uid(uid)
            .unwrap()
            .map_or_else(|| uid.as_raw().to_string(), |u| u.name)
    }

    #[test]
    fn test_owner_matches_current_user() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        std::fs::write(&path, "").unwrap();

        let me = current_user_name();
        assert_eq!(check(OptionKey::Owner, &path, true, &me.into()), CheckOutcome::Passed);
    }

    #[test]
    fn test_owner_mismatch_message() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        std::fs::write(&path, "").unwrap();

        let me = current_user_name();
        let outcome = check(OptionKey::Owner, &path, true, &"no-such-user-xyz".into());
        assert_eq!(
            outcome,
            CheckOutcome::Failed(format!(
                r#"expected owner to be "no-such-user-xyz", but it was "{me}""#
            ))
        );
    }

    #[test]
    fn test_lookup_error_names_the_option() {
        let path = Path::new("/srv/app");
        let err = lookup_error(Identity::Owner, path, nix::Error::EIO);
        match err {
            FetchError::Failed(msg) => {
                assert!(msg.starts_with("cannot resolve owner of '/srv/app': "), "{msg}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        let err = lookup_error(Identity::Group, path, nix::Error::EIO);
        assert!(matches!(err, FetchError::Failed(msg) if msg.starts_with("cannot resolve group of")));
    }

    #[test]
    fn test_group_accepts_predicate() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = check(
            OptionKey::Group,
            tmp.path(),
            true,
            &predicate::from_fn("be named", |v| v.as_text().is_some_and(|s| !s.is_empty())),
        );
        assert_eq!(outcome, CheckOutcome::Passed);
    }
}
