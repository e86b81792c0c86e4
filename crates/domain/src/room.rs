use crate::value_objects::{RoomId, Timestamp, UserId};

/// 房间数据投影，`create` / `rename` 操作的返回值。
///
/// 房间本身由消息子系统持有，这里只是对其查询结果的快照。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomData {
    pub room_id: RoomId,
    pub owner_id: UserId,
    pub name: String,
    pub user_count: usize,
    pub created_at: Timestamp,
}

/// 房间成员投影，`users` 操作的返回值条目。
///
/// `can_kick` 不是存储字段，由调用者身份逐次计算：
/// 只有房主能踢人，且不能对自己显示踢出入口。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomUser {
    pub uid: UserId,
    pub username: String,
    pub can_kick: bool,
}
