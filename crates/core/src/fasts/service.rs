//! Domain service: the application-facing mutation surface.
//!
//! Resolves the signed-in user, validates input, and enforces the rules the
//! repositories alone cannot see (duplicate-day prevention is check-then-
//! create here, not a storage constraint).

use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::fasts::{
    Fast, FastBlock, FastBlockPatch, FastBlockRepositoryTrait, FastDay, FastDayPatch,
    FastDayRepositoryTrait, FastPatch, FastRepositoryTrait, NewFast, NewFastBlock, NewFastDay,
};
use crate::session::SessionProvider;

pub struct FastService {
    fasts: Arc<dyn FastRepositoryTrait>,
    blocks: Arc<dyn FastBlockRepositoryTrait>,
    days: Arc<dyn FastDayRepositoryTrait>,
    session: Arc<dyn SessionProvider>,
}

impl FastService {
    pub fn new(
        fasts: Arc<dyn FastRepositoryTrait>,
        blocks: Arc<dyn FastBlockRepositoryTrait>,
        days: Arc<dyn FastDayRepositoryTrait>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            fasts,
            blocks,
            days,
            session,
        }
    }

    fn current_user(&self) -> Result<String> {
        self.session.current_user().ok_or(Error::Unauthenticated)
    }

    fn require_fast(&self, fast_id: &str) -> Result<Fast> {
        self.fasts
            .get(fast_id)?
            .ok_or_else(|| Error::not_found(format!("fast '{}' does not exist", fast_id)))
    }

    // ── Fasts ────────────────────────────────────────────────────────────

    pub fn list_fasts(&self) -> Result<Vec<Fast>> {
        let user_id = self.current_user()?;
        self.fasts.list_for_user(&user_id)
    }

    pub fn active_fast(&self) -> Result<Option<Fast>> {
        let user_id = self.current_user()?;
        self.fasts.active_for_user(&user_id)
    }

    pub async fn create_fast(&self, new_fast: NewFast) -> Result<Fast> {
        let user_id = self.current_user()?;
        if new_fast.name.trim().is_empty() {
            return Err(Error::validation("fast name must not be empty"));
        }
        if new_fast.total_days <= 0 {
            return Err(Error::validation("total_days must be positive"));
        }
        if new_fast.days_completed_before_app < 0 {
            return Err(Error::validation(
                "days_completed_before_app must not be negative",
            ));
        }
        self.fasts.create(new_fast, user_id).await
    }

    pub async fn update_fast(&self, fast_id: &str, patch: FastPatch) -> Result<Fast> {
        self.current_user()?;
        if matches!(patch.total_days, Some(days) if days <= 0) {
            return Err(Error::validation("total_days must be positive"));
        }
        self.fasts.update(fast_id.to_string(), patch).await
    }

    pub async fn delete_fast(&self, fast_id: &str) -> Result<usize> {
        self.current_user()?;
        self.fasts.delete(fast_id.to_string()).await
    }

    pub async fn set_active_fast(&self, fast_id: &str) -> Result<Fast> {
        let user_id = self.current_user()?;
        self.fasts.set_active(fast_id.to_string(), user_id).await
    }

    // ── Blocks ───────────────────────────────────────────────────────────

    pub fn list_blocks(&self, fast_id: &str) -> Result<Vec<FastBlock>> {
        self.current_user()?;
        self.blocks.list_for_fast(fast_id)
    }

    pub async fn add_block(&self, new_block: NewFastBlock) -> Result<FastBlock> {
        self.current_user()?;
        if new_block.total_days <= 0 {
            return Err(Error::validation("total_days must be positive"));
        }
        self.require_fast(&new_block.fast_id)?;
        self.blocks.create(new_block).await
    }

    pub async fn update_block(&self, block_id: &str, patch: FastBlockPatch) -> Result<FastBlock> {
        self.current_user()?;
        if matches!(patch.total_days, Some(days) if days <= 0) {
            return Err(Error::validation("total_days must be positive"));
        }
        self.blocks.update(block_id.to_string(), patch).await
    }

    pub async fn remove_block(&self, block_id: &str) -> Result<usize> {
        self.current_user()?;
        self.blocks.delete(block_id.to_string()).await
    }

    // ── Days ─────────────────────────────────────────────────────────────

    pub fn list_days(&self, fast_id: &str) -> Result<Vec<FastDay>> {
        self.current_user()?;
        self.days.list_for_fast(fast_id)
    }

    /// Logs a day for a fast. At most one day per date per fast: an
    /// existing record for the date rejects the call before any write.
    pub async fn log_day(&self, new_day: NewFastDay) -> Result<FastDay> {
        self.current_user()?;
        self.require_fast(&new_day.fast_id)?;
        if self
            .days
            .find_by_date(&new_day.fast_id, &new_day.date)?
            .is_some()
        {
            return Err(Error::validation(format!(
                "a day is already logged for {}",
                new_day.date
            )));
        }
        self.days.create(new_day).await
    }

    pub async fn set_day_completed(&self, day_id: &str, completed: bool) -> Result<FastDay> {
        self.current_user()?;
        self.days
            .update(
                day_id.to_string(),
                FastDayPatch {
                    completed: Some(completed),
                    ..FastDayPatch::default()
                },
            )
            .await
    }

    pub async fn remove_day(&self, day_id: &str) -> Result<usize> {
        self.current_user()?;
        self.days.delete(day_id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedSession(Option<String>);

    impl SessionProvider for FixedSession {
        fn current_user(&self) -> Option<String> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct MemFasts {
        rows: Mutex<HashMap<String, Fast>>,
    }

    impl MemFasts {
        fn seed(&self, fast: Fast) {
            self.rows.lock().unwrap().insert(fast.id.clone(), fast);
        }
    }

    fn fast_row(id: &str, user_id: &str) -> Fast {
        Fast {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Daniel Fast".to_string(),
            total_days: 21,
            start_date: "2024-03-01".to_string(),
            days_completed_before_app: 0,
            is_active: false,
            created_at: "2024-03-01T08:00:00+00:00".to_string(),
            updated_at: "2024-03-01T08:00:00+00:00".to_string(),
            pending_sync: true,
            last_synced: None,
        }
    }

    #[async_trait]
    impl FastRepositoryTrait for MemFasts {
        fn get(&self, fast_id: &str) -> Result<Option<Fast>> {
            Ok(self.rows.lock().unwrap().get(fast_id).cloned())
        }

        fn list_for_user(&self, user_id: &str) -> Result<Vec<Fast>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|fast| fast.user_id == user_id)
                .cloned()
                .collect())
        }

        fn active_for_user(&self, user_id: &str) -> Result<Option<Fast>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|fast| fast.user_id == user_id && fast.is_active)
                .cloned())
        }

        async fn create(&self, new_fast: NewFast, user_id: String) -> Result<Fast> {
            let mut fast = fast_row(&format!("fast-{}", new_fast.name), &user_id);
            fast.name = new_fast.name;
            fast.total_days = new_fast.total_days;
            self.seed(fast.clone());
            Ok(fast)
        }

        async fn update(&self, fast_id: String, patch: FastPatch) -> Result<Fast> {
            let mut rows = self.rows.lock().unwrap();
            let fast = rows
                .get_mut(&fast_id)
                .ok_or_else(|| Error::not_found(fast_id))?;
            if let Some(name) = patch.name {
                fast.name = name;
            }
            if let Some(active) = patch.is_active {
                fast.is_active = active;
            }
            Ok(fast.clone())
        }

        async fn delete(&self, fast_id: String) -> Result<usize> {
            Ok(self.rows.lock().unwrap().remove(&fast_id).map_or(0, |_| 1))
        }

        async fn set_active(&self, fast_id: String, user_id: String) -> Result<Fast> {
            let mut rows = self.rows.lock().unwrap();
            for fast in rows.values_mut() {
                if fast.user_id == user_id {
                    fast.is_active = fast.id == fast_id;
                }
            }
            rows.get(&fast_id)
                .cloned()
                .ok_or_else(|| Error::not_found(fast_id))
        }
    }

    #[derive(Default)]
    struct MemBlocks;

    #[async_trait]
    impl FastBlockRepositoryTrait for MemBlocks {
        fn get(&self, _block_id: &str) -> Result<Option<FastBlock>> {
            Ok(None)
        }

        fn list_for_fast(&self, _fast_id: &str) -> Result<Vec<FastBlock>> {
            Ok(Vec::new())
        }

        async fn create(&self, new_block: NewFastBlock) -> Result<FastBlock> {
            Ok(FastBlock {
                id: "b1".to_string(),
                fast_id: new_block.fast_id,
                name: new_block.name,
                total_days: new_block.total_days,
                order_index: 0,
                manually_completed: false,
                created_at: "2024-03-01T08:00:00+00:00".to_string(),
                pending_sync: true,
                last_synced: None,
            })
        }

        async fn update(&self, block_id: String, _patch: FastBlockPatch) -> Result<FastBlock> {
            Err(Error::not_found(block_id))
        }

        async fn delete(&self, _block_id: String) -> Result<usize> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct MemDays {
        rows: Mutex<HashMap<String, FastDay>>,
    }

    #[async_trait]
    impl FastDayRepositoryTrait for MemDays {
        fn get(&self, day_id: &str) -> Result<Option<FastDay>> {
            Ok(self.rows.lock().unwrap().get(day_id).cloned())
        }

        fn list_for_fast(&self, fast_id: &str) -> Result<Vec<FastDay>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|day| day.fast_id == fast_id)
                .cloned()
                .collect())
        }

        fn find_by_date(&self, fast_id: &str, date: &str) -> Result<Option<FastDay>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|day| day.fast_id == fast_id && day.date == date)
                .cloned())
        }

        async fn create(&self, new_day: NewFastDay) -> Result<FastDay> {
            let day = FastDay {
                id: format!("day-{}", new_day.date),
                fast_id: new_day.fast_id,
                block_id: new_day.block_id,
                date: new_day.date,
                completed: new_day.completed,
                created_at: "2024-03-01T08:00:00+00:00".to_string(),
                pending_sync: true,
                last_synced: None,
            };
            self.rows
                .lock()
                .unwrap()
                .insert(day.id.clone(), day.clone());
            Ok(day)
        }

        async fn update(&self, day_id: String, patch: FastDayPatch) -> Result<FastDay> {
            let mut rows = self.rows.lock().unwrap();
            let day = rows
                .get_mut(&day_id)
                .ok_or_else(|| Error::not_found(day_id))?;
            if let Some(completed) = patch.completed {
                day.completed = completed;
            }
            Ok(day.clone())
        }

        async fn delete(&self, day_id: String) -> Result<usize> {
            Ok(self.rows.lock().unwrap().remove(&day_id).map_or(0, |_| 1))
        }
    }

    fn service_with_session(user: Option<&str>) -> (FastService, Arc<MemFasts>, Arc<MemDays>) {
        let fasts = Arc::new(MemFasts::default());
        let days = Arc::new(MemDays::default());
        let service = FastService::new(
            fasts.clone(),
            Arc::new(MemBlocks),
            days.clone(),
            Arc::new(FixedSession(user.map(str::to_string))),
        );
        (service, fasts, days)
    }

    #[tokio::test]
    async fn create_fast_requires_session() {
        let (service, _, _) = service_with_session(None);
        let result = service
            .create_fast(NewFast {
                name: "Daniel Fast".to_string(),
                total_days: 21,
                start_date: "2024-03-01".to_string(),
                days_completed_before_app: 0,
                is_active: false,
            })
            .await;
        assert!(matches!(result, Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn create_fast_rejects_non_positive_duration() {
        let (service, _, _) = service_with_session(Some("u1"));
        let result = service
            .create_fast(NewFast {
                name: "Daniel Fast".to_string(),
                total_days: 0,
                start_date: "2024-03-01".to_string(),
                days_completed_before_app: 0,
                is_active: false,
            })
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn log_day_rejects_duplicate_date() {
        let (service, fasts, _) = service_with_session(Some("u1"));
        fasts.seed(fast_row("f1", "u1"));

        let first = NewFastDay {
            fast_id: "f1".to_string(),
            block_id: None,
            date: "2024-03-01".to_string(),
            completed: true,
        };
        service.log_day(first.clone()).await.expect("first day");

        let duplicate = service.log_day(first).await;
        assert!(matches!(duplicate, Err(Error::Validation(_))));

        let other_date = service
            .log_day(NewFastDay {
                fast_id: "f1".to_string(),
                block_id: None,
                date: "2024-03-02".to_string(),
                completed: false,
            })
            .await;
        assert!(other_date.is_ok());
    }

    #[tokio::test]
    async fn log_day_requires_existing_fast() {
        let (service, _, _) = service_with_session(Some("u1"));
        let result = service
            .log_day(NewFastDay {
                fast_id: "missing".to_string(),
                block_id: None,
                date: "2024-03-01".to_string(),
                completed: false,
            })
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
