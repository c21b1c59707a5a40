//! Integration tests over a saved ledger snapshot.

use commune_metrics::compute::BondsMa;
use commune_metrics::report;
use commune_metrics::{
    DeriveError, FetchError, LedgerSnapshot, ModuleType, NetworkConfig, ReportError,
};
use std::path::Path;

fn load_snapshot() -> LedgerSnapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata/snapshot.json");
    LedgerSnapshot::from_path(&path).unwrap_or_else(|e| panic!("load {}: {}", path.display(), e))
}

#[tokio::test]
async fn integration_module_views() {
    let snap = load_snapshot();
    let cfg = NetworkConfig::default();
    let resp = report::subnet_modules(&snap, &cfg, 0).await.unwrap();
    assert_eq!(resp.modules.len(), 3);
    let keys: Vec<&str> = resp.modules.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, ["5CkNew", "5CkMiner", "5CkValidator"]);

    let fresh = resp.modules.iter().find(|m| m.key == "5CkNew").unwrap();
    assert_eq!(fresh.stake, 1.0);
    assert_eq!(fresh.emission, 0.0);
    assert!(fresh.in_immunity);
    assert_eq!(fresh.module_type, ModuleType::Inactive);

    let miner = resp.modules.iter().find(|m| m.key == "5CkMiner").unwrap();
    assert_eq!(miner.stake, 2.35);
    assert_eq!(miner.emission, 123.4568);
    assert!(!miner.in_immunity);
    assert_eq!(miner.module_type, ModuleType::Miner);

    let validator = resp.modules.iter().find(|m| m.key == "5CkValidator").unwrap();
    assert_eq!(validator.stake, 100.0);
    assert_eq!(validator.module_type, ModuleType::Validator);
    // regblock 90 + immunity 50 == current block 140
    assert!(!validator.in_immunity);
}

#[tokio::test]
async fn integration_module_json_hides_opaque_fields() {
    let snap = load_snapshot();
    let resp = report::subnet_modules(&snap, &NetworkConfig::default(), 0)
        .await
        .unwrap();
    let json = serde_json::to_value(&resp).unwrap();
    for module in json["modules"].as_array().unwrap() {
        let obj = module.as_object().unwrap();
        for hidden in ["stake_from", "metadata", "last_update", "regblock"] {
            assert!(!obj.contains_key(hidden), "{hidden} in {obj:?}");
        }
        assert!(obj.contains_key("name"));
        assert!(obj.contains_key("type"));
        assert!(obj.contains_key("in_immunity"));
    }
}

#[tokio::test]
async fn integration_empty_registry() {
    let snap = load_snapshot();
    let resp = report::subnet_modules(&snap, &NetworkConfig::default(), 1)
        .await
        .unwrap();
    assert!(resp.modules.is_empty());
}

#[tokio::test]
async fn integration_missing_mandatory_input_fails() {
    let snap = load_snapshot();
    let err = report::subnet_modules(&snap, &NetworkConfig::default(), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Fetch(FetchError::NotFound(_))), "{err}");
}

#[tokio::test]
async fn integration_subnet_ranking() {
    let snap = load_snapshot();
    let resp = report::subnets(&snap, &NetworkConfig::default()).await.unwrap();
    let order: Vec<u16> = resp.subnets.iter().map(|s| s.netuid).collect();
    assert_eq!(order, [1, 0, 2, 3]);
    assert_eq!(resp.subnets[1].stake, 600_000.0);
    assert_eq!(resp.subnets[3].stake, 0.0);
    assert_eq!(
        resp.subnets[1].bonds_ma,
        Some(BondsMa::Display("0.9 COMAI".into()))
    );
    assert_eq!(resp.subnets[0].bonds_ma, Some(BondsMa::Raw(0)));
    assert_eq!(resp.subnets[2].bonds_ma, None);
    let json = serde_json::to_value(&resp.subnets[0]).unwrap();
    assert_eq!(json["name"], "text");
}

#[tokio::test]
async fn integration_rewards() {
    let snap = load_snapshot();
    let cfg = NetworkConfig::default();
    let daily = report::daily_emission(&snap, &cfg).await.unwrap();
    assert_eq!(daily.daily_emission, 10_800);
    // 5400 * 0.68 * 365 / 1_000_000 * 100 = 134.028
    let apr = report::apr(&snap, &cfg).await.unwrap();
    assert_eq!(apr.apr, 135);
}

#[tokio::test]
async fn integration_apr_without_stake_is_undefined() {
    let mut snap = load_snapshot();
    snap.total_stake.clear();
    let err = report::apr(&snap, &NetworkConfig::default()).await.unwrap_err();
    assert!(matches!(err, ReportError::Derive(DeriveError::NoStake)), "{err}");
}
