use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;
use tokio::sync::watch;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::setting::{Setting, Theme, THEME_KEY};

/// Light/dark preference, persisted under [`THEME_KEY`].
#[derive(Clone)]
pub(crate) struct ThemeStore {
    settings: Repository<Setting>,
    current: Arc<watch::Sender<Theme>>,
}

impl ThemeStore {
    /// Saved preference first, then the configured default, then light.
    pub async fn load(store: &Store, default: Option<Theme>) -> Result<Self, ApiError> {
        let settings = Repository::<Setting>::new(store.clone());
        let saved = match settings.find_by_id(THEME_KEY).await? {
            Some(setting) => match serde_json::from_value::<Theme>(setting.value) {
                Ok(theme) => Some(theme),
                Err(e) => {
                    warn!("ignoring stored theme, {}", e);
                    None
                }
            },
            None => None,
        };
        let theme = saved.or(default).unwrap_or_default();
        let (current, _) = watch::channel(theme);
        Ok(Self {
            settings,
            current: Arc::new(current),
        })
    }

    pub fn get(&self) -> Theme {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.current.subscribe()
    }

    pub async fn set(&self, theme: Theme) -> Result<Theme, ApiError> {
        let setting = Setting {
            id: THEME_KEY.to_string(),
            value: Value::String(theme.to_string()),
        };
        if self.settings.find_by_id(THEME_KEY).await?.is_some() {
            self.settings.update(&setting).await?;
        } else {
            self.settings.create(setting).await?;
        }
        self.current.send_replace(theme);
        Ok(theme)
    }

    pub async fn toggle(&self) -> Result<Theme, ApiError> {
        self.set(self.get().toggled()).await
    }
}

/// Log each theme change until the store goes away.
pub(crate) async fn log_changes(mut changes: watch::Receiver<Theme>) {
    while changes.changed().await.is_ok() {
        let theme = *changes.borrow_and_update();
        info!("theme switched to {}", theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::database::memory::MemoryStore;

    #[tokio::test]
    async fn falls_back_to_default_then_light() {
        let store = Store::Memory(MemoryStore::new());
        assert_eq!(ThemeStore::load(&store, None).await.unwrap().get(), Theme::Light);
        assert_eq!(
            ThemeStore::load(&store, Some(Theme::Dark)).await.unwrap().get(),
            Theme::Dark
        );
    }

    #[tokio::test]
    async fn saved_preference_wins() {
        let store = Store::Memory(MemoryStore::new());
        let themes = ThemeStore::load(&store, None).await.unwrap();
        let mut changes = themes.subscribe();
        assert_eq!(themes.toggle().await.unwrap(), Theme::Dark);
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), Theme::Dark);

        let reloaded = ThemeStore::load(&store, Some(Theme::Light)).await.unwrap();
        assert_eq!(reloaded.get(), Theme::Dark);
        assert_eq!(reloaded.toggle().await.unwrap(), Theme::Light);
        assert_eq!(ThemeStore::load(&store, None).await.unwrap().get(), Theme::Light);
    }
}
