use crate::error::{RepoError, RepoResult};

/// What kind of access an operation performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Declared requirements of one operation, checked before dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpCapabilities {
    pub access: AccessMode,
    /// Whether the operation needs an existing repository (as opposed
    /// to, say, `init` or a plain object decode).
    pub requires_repository: bool,
}

impl OpCapabilities {
    pub const fn read_only() -> Self {
        Self {
            access: AccessMode::ReadOnly,
            requires_repository: true,
        }
    }

    pub const fn read_write() -> Self {
        Self {
            access: AccessMode::ReadWrite,
            requires_repository: true,
        }
    }

    pub const fn standalone(access: AccessMode) -> Self {
        Self {
            access,
            requires_repository: false,
        }
    }
}

/// The context an operation would run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Environment {
    pub repository_exists: bool,
    pub read_only: bool,
}

/// Check `caps` against `env`, then dispatch `op`.
///
/// Centralizing the check keeps the read-only toggle from being
/// bypassable through any individual operation's code path.
pub fn run_op<T>(
    env: &Environment,
    caps: OpCapabilities,
    op: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    if caps.requires_repository && !env.repository_exists {
        return Err(RepoError::NoRepository);
    }
    if caps.access == AccessMode::ReadWrite && env.read_only {
        return Err(RepoError::ReadOnly);
    }
    op()
}
