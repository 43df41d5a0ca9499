//! ============================================================================
//! Cloud Save - Snapshot of wallet, ownership and equipment
//! ============================================================================
//! Last write wins. Restoring applies the snapshot wholesale; the session
//! then re-resolves entitlements and re-checks equipped items.
//! ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::REMOVE_ADS;
use crate::entitlements::{owned_products_from_serialized, serialize_owned_products};
use crate::store::Prefs;
use crate::types::PlatformError;

/// What travels to cloud storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSnapshot {
    pub coins: u64,
    pub owned_products_csv: String,
    #[serde(default)]
    pub coin_products_csv: String,
    pub equipped_skin: String,
    pub equipped_sound: String,
    pub ads_removed: bool,
}

impl CloudSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| anyhow!("Failed to encode snapshot: {}", e))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| anyhow!("Failed to decode snapshot: {}", e))
    }
}

/// Cloud storage boundary
#[async_trait]
pub trait CloudStorage: Send + Sync {
    async fn save(&self, snapshot: &CloudSnapshot) -> Result<(), PlatformError>;

    async fn load(&self) -> Result<Option<CloudSnapshot>, PlatformError>;
}

/// Moves snapshots between `Prefs` and a `CloudStorage`
pub struct CloudSync<S: CloudStorage> {
    storage: S,
    prefs: Prefs,
}

impl<S: CloudStorage> CloudSync<S> {
    pub fn new(storage: S, prefs: Prefs) -> Self {
        Self { storage, prefs }
    }

    pub fn snapshot(&self) -> CloudSnapshot {
        snapshot_from(&self.prefs)
    }

    /// Upload the current state. `false` when storage is unavailable.
    pub async fn save(&self) -> bool {
        match self.storage.save(&self.snapshot()).await {
            Ok(()) => {
                info!("Cloud save written");
                true
            }
            Err(e) => {
                warn!("Cloud save skipped: {}", e);
                false
            }
        }
    }

    /// Download and apply. `Ok(false)` when there was nothing to apply.
    pub async fn restore(&self) -> Result<bool> {
        let snapshot = match self.storage.load().await {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("Cloud load skipped: {}", e);
                return Ok(false);
            }
        };
        apply_snapshot(&self.prefs, &snapshot)?;
        info!("Cloud save restored ({} coins)", snapshot.coins);
        Ok(true)
    }
}

pub fn snapshot_from(prefs: &Prefs) -> CloudSnapshot {
    CloudSnapshot {
        coins: prefs.coins(),
        owned_products_csv: prefs.owned_products_csv(),
        coin_products_csv: prefs.coin_products_csv(),
        equipped_skin: prefs.equipped_skin(),
        equipped_sound: prefs.equipped_sound(),
        ads_removed: prefs.ads_removed(),
    }
}

/// Overwrite local state with a snapshot. An `adsRemoved` flag without the
/// product in the CSV still restores ad removal.
pub fn apply_snapshot(prefs: &Prefs, snapshot: &CloudSnapshot) -> Result<()> {
    let mut owned = owned_products_from_serialized(&snapshot.owned_products_csv);
    if snapshot.ads_removed {
        owned.insert(REMOVE_ADS.to_string());
    }
    let coin_owned = owned_products_from_serialized(&snapshot.coin_products_csv);

    prefs.set_coins(snapshot.coins)?;
    prefs.set_owned_products_csv(&serialize_owned_products(&owned))?;
    prefs.set_coin_products_csv(&serialize_owned_products(&coin_owned))?;
    prefs.set_equipped_skin(&snapshot.equipped_skin)?;
    prefs.set_equipped_sound(&snapshot.equipped_sound)?;
    prefs.set_ads_removed(owned.contains(REMOVE_ADS))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockCloud {
        slot: Mutex<Option<CloudSnapshot>>,
        offline: bool,
    }

    #[async_trait]
    impl CloudStorage for MockCloud {
        async fn save(&self, snapshot: &CloudSnapshot) -> Result<(), PlatformError> {
            if self.offline {
                return Err(PlatformError::Unavailable("offline".into()));
            }
            *self.slot.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<CloudSnapshot>, PlatformError> {
            if self.offline {
                return Err(PlatformError::Timeout);
            }
            Ok(self.slot.lock().unwrap().clone())
        }
    }

    fn prefs() -> Prefs {
        Prefs::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_json_shape() {
        let snap = CloudSnapshot {
            coins: 50,
            owned_products_csv: "remove_ads".into(),
            coin_products_csv: String::new(),
            equipped_skin: "skin_001".into(),
            equipped_sound: "sound_001".into(),
            ads_removed: true,
        };
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"ownedProductsCsv\":\"remove_ads\""));
        assert!(json.contains("\"adsRemoved\":true"));

        // Older saves lack the coin ledger
        let old = r#"{"coins":5,"ownedProductsCsv":"","equippedSkin":"skin_002","equippedSound":"sound_001","adsRemoved":false}"#;
        assert_eq!(CloudSnapshot::from_json(old).unwrap().coin_products_csv, "");
    }

    #[tokio::test]
    async fn test_save_then_restore_elsewhere() {
        let source = prefs();
        source.set_coins(900).unwrap();
        source.set_coin_products_csv("skin_003").unwrap();
        source.set_equipped_skin("skin_003").unwrap();

        let cloud = MockCloud::default();
        let sync = CloudSync::new(cloud, source);
        assert!(sync.save().await);

        let target = prefs();
        let restore = CloudSync::new(
            MockCloud {
                slot: Mutex::new(sync.storage.slot.lock().unwrap().clone()),
                offline: false,
            },
            target.clone(),
        );
        assert!(restore.restore().await.unwrap());
        assert_eq!(target.coins(), 900);
        assert_eq!(target.coin_products_csv(), "skin_003");
        assert_eq!(target.equipped_skin(), "skin_003");
    }

    #[tokio::test]
    async fn test_offline_is_a_no_op() {
        let p = prefs();
        p.set_coins(10).unwrap();
        let sync = CloudSync::new(
            MockCloud {
                offline: true,
                ..Default::default()
            },
            p.clone(),
        );
        assert!(!sync.save().await);
        assert!(!sync.restore().await.unwrap());
        assert_eq!(p.coins(), 10);
    }

    #[test]
    fn test_ads_removed_flag_restores_product() {
        let p = prefs();
        let snap = CloudSnapshot {
            coins: 0,
            owned_products_csv: "skin_020".into(),
            coin_products_csv: String::new(),
            equipped_skin: "skin_020".into(),
            equipped_sound: "sound_001".into(),
            ads_removed: true,
        };
        apply_snapshot(&p, &snap).unwrap();
        assert_eq!(p.owned_products_csv(), "remove_ads,skin_020");
        assert!(p.ads_removed());
    }
}
