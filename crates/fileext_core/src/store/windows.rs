//! Windows registry backend.
//!
//! # Invariants
//! - Each write opens (creating if needed) its own key handle and drops it
//!   before returning; no handle outlives a call.
//! - The configured WOW64 view flag is applied to every key creation.

use super::{KeyValueStore, RegistryRoot, RegistryView, StoreError, StoreResult};
use log::debug;
use winreg::enums::{
    HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_WOW64_32KEY, KEY_WOW64_64KEY, KEY_WRITE,
};
use winreg::RegKey;

/// Registry-backed store writing through a fixed view.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinRegistryStore {
    view: RegistryView,
}

impl WinRegistryStore {
    pub fn new(view: RegistryView) -> Self {
        Self { view }
    }

    pub fn view(&self) -> RegistryView {
        self.view
    }

    fn open_for_write(&self, root: RegistryRoot, path: &str) -> StoreResult<RegKey> {
        let hive = match root {
            RegistryRoot::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
            RegistryRoot::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        };
        let flags = match self.view {
            RegistryView::Native => KEY_WRITE,
            RegistryView::Registry32 => KEY_WRITE | KEY_WOW64_32KEY,
            RegistryView::Registry64 => KEY_WRITE | KEY_WOW64_64KEY,
        };
        let (key, _disposition) = hive
            .create_subkey_with_flags(path, flags)
            .map_err(|source| StoreError::Io {
                root,
                path: path.to_string(),
                source,
            })?;
        debug!(
            "event=registry_open module=store status=ok root={} view={}",
            root,
            self.view.as_str()
        );
        Ok(key)
    }
}

impl KeyValueStore for WinRegistryStore {
    fn write_default_value(
        &self,
        root: RegistryRoot,
        path: &str,
        value: &str,
    ) -> StoreResult<()> {
        self.write_named_value(root, path, "", value)
    }

    fn write_named_value(
        &self,
        root: RegistryRoot,
        path: &str,
        name: &str,
        value: &str,
    ) -> StoreResult<()> {
        let key = self.open_for_write(root, path)?;
        key.set_value(name, &value.to_string())
            .map_err(|source| StoreError::Io {
                root,
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::WinRegistryStore;
    use crate::store::{KeyValueStore, RegistryRoot, RegistryView};
    use std::time::{SystemTime, UNIX_EPOCH};
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;

    fn scratch_key_path() -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        format!("Software\\fileext-test-{}-{nanos}", std::process::id())
    }

    #[test]
    fn writes_default_and_named_values_under_current_user() {
        let base = scratch_key_path();
        let nested = format!("{base}\\.foo\\OpenWithProgids");
        let store = WinRegistryStore::new(RegistryView::Native);
        assert_eq!(store.view(), RegistryView::Native);

        store
            .write_default_value(RegistryRoot::CurrentUser, &base, "FooApp.1")
            .expect("default write");
        store
            .write_named_value(RegistryRoot::CurrentUser, &base, "Content Type", "text/foo")
            .expect("named write");
        store
            .write_named_value(RegistryRoot::CurrentUser, &nested, "BarApp.2", "")
            .expect("nested write creates intermediate keys");

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = hkcu.open_subkey(&base).expect("key exists");
        let default: String = key.get_value("").expect("default value");
        let content_type: String = key.get_value("Content Type").expect("content type");
        let open_with: String = hkcu
            .open_subkey(&nested)
            .expect("nested key exists")
            .get_value("BarApp.2")
            .expect("open-with value");

        hkcu.delete_subkey_all(&base).expect("cleanup");

        assert_eq!(default, "FooApp.1");
        assert_eq!(content_type, "text/foo");
        assert_eq!(open_with, "");
    }
}
