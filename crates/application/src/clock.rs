//! 服务写入 `createdAt` / `updatedAt` 时的时间来源

use chrono::{SubsecRound, Utc};
use domain::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// 墙上时钟。精度截到微秒，与 TIMESTAMPTZ 列一致，
/// 写入后再读出的时间戳与内存中的值相等。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().trunc_subsecs(6)
    }
}
