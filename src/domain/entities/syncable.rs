use crate::domain::value_objects::{PendingOperationType, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// ローカルスナップショットとアウトボックスを持つリモート所有エンティティ。
pub trait SyncEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const SNAPSHOT_KEY: StorageKey;
    const OPERATION_TYPE: PendingOperationType;

    fn entity_id(&self) -> Option<&str>;
}

/// ID が一致する要素を置き換え、ID を持たない/一致しない場合は末尾に追加する
pub fn upsert_into<E: SyncEntity>(snapshot: &mut Vec<E>, entity: E) {
    let existing = entity
        .entity_id()
        .and_then(|id| snapshot.iter().position(|item| item.entity_id() == Some(id)));

    match existing {
        Some(index) => snapshot[index] = entity,
        None => snapshot.push(entity),
    }
}
