//! Elevation check used to gate machine-wide writes.

/// Answers whether the calling identity holds the administrator role.
pub trait PrivilegeCheck {
    fn is_administrator(&self) -> bool;
}

impl<P: PrivilegeCheck + ?Sized> PrivilegeCheck for &P {
    fn is_administrator(&self) -> bool {
        (**self).is_administrator()
    }
}

/// Queries the security token of the current process.
///
/// On Windows this asks the shell whether the token is a member of the
/// built-in Administrators group; under UAC that is only true for an elevated
/// process. Other platforms have no such role and always answer `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPrivilege;

impl PrivilegeCheck for ProcessPrivilege {
    #[cfg(windows)]
    fn is_administrator(&self) -> bool {
        // SAFETY: IsUserAnAdmin takes no arguments and only reads the
        // current process token.
        unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() != 0 }
    }

    #[cfg(not(windows))]
    fn is_administrator(&self) -> bool {
        false
    }
}

/// Fixed answer, for tests and dry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPrivilege(pub bool);

impl PrivilegeCheck for StaticPrivilege {
    fn is_administrator(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{PrivilegeCheck, ProcessPrivilege, StaticPrivilege};

    #[test]
    fn static_privilege_returns_configured_answer() {
        assert!(StaticPrivilege(true).is_administrator());
        assert!(!StaticPrivilege(false).is_administrator());
        assert!((&StaticPrivilege(true)).is_administrator());
    }

    #[cfg(not(windows))]
    #[test]
    fn process_privilege_is_never_admin_off_windows() {
        assert!(!ProcessPrivilege.is_administrator());
    }

    #[cfg(windows)]
    #[test]
    fn process_privilege_is_stable_across_calls() {
        let first = ProcessPrivilege.is_administrator();
        assert_eq!(ProcessPrivilege.is_administrator(), first);
    }
}
