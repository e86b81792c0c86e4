//! 聊天 API 用例服务。
//!
//! 六个操作（create / post / rename / users / invite / kick）都是同一个
//! 形状：会话限流（仅发消息类操作）→ 入参校验 → 顺序或并发地委托
//! 给消息/用户子系统 → 部分操作附带一次实时通知副作用 → 返回委托
//! 结果的投影。这里不落任何持久状态。

use std::sync::Arc;

use domain::{
    ChatError, ChatMessage, MessageContent, MessageDraft, RoomData, RoomId, RoomName, RoomUser,
    UserId,
};
use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::{
    caller::Caller,
    clock::Clock,
    error::ApplicationError,
    gateway::{MessagingGateway, UserGateway},
    hooks::{MessageHooks, OutgoingMessage},
    notifier::{RealtimeNotifier, RoomRenameEvent, EVENT_ROOM_RENAME},
    rate_limiter::MessageRateLimiter,
};

#[derive(Debug, Clone)]
pub struct CreateRoomRequest {
    /// 受邀用户，缺失（payload 里没给）与空列表是两回事
    pub uids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    pub room_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RenameRoomRequest {
    pub room_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct InviteUsersRequest {
    pub room_id: Uuid,
    pub uids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct KickUsersRequest {
    pub room_id: Uuid,
    pub uids: Option<Vec<Uuid>>,
}

pub struct ChatsServiceDependencies {
    pub messaging: Arc<dyn MessagingGateway>,
    pub users: Arc<dyn UserGateway>,
    pub hooks: Arc<dyn MessageHooks>,
    pub notifier: Arc<dyn RealtimeNotifier>,
    pub clock: Arc<dyn Clock>,
    pub rate_limiter: Arc<MessageRateLimiter>,
    /// 房间成员数上限，None 表示不限制
    pub max_room_users: Option<usize>,
}

pub struct ChatsService {
    deps: ChatsServiceDependencies,
}

impl ChatsService {
    pub fn new(deps: ChatsServiceDependencies) -> Self {
        Self { deps }
    }

    fn check_rate_limit(&self, caller: &Caller) -> Result<(), ApplicationError> {
        if let Err(err) = self.deps.rate_limiter.check_message_rate(caller) {
            tracing::debug!(uid = %caller.uid, error = %err, "消息限流命中");
            return Err(ChatError::TooManyMessages.into());
        }
        Ok(())
    }

    /// uids 字段缺失按参数类型错误处理，与原实现的 Array 检查对应
    fn require_uids(uids: Option<Vec<Uuid>>) -> Result<Vec<UserId>, ChatError> {
        let uids =
            uids.ok_or_else(|| ChatError::wrong_parameter_type("uids", "array", "null"))?;
        Ok(uids.into_iter().map(UserId::from).collect())
    }

    /// 创建房间：限流 → 逐个检查可否私聊受邀用户 → 建房 → 返回房间数据
    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateRoomRequest,
    ) -> Result<RoomData, ApplicationError> {
        self.check_rate_limit(caller)?;

        let uids = Self::require_uids(request.uids)?;

        try_join_all(
            uids.iter()
                .map(|&uid| self.deps.messaging.can_message_user(caller.uid, uid)),
        )
        .await?;

        let room_id = self.deps.messaging.new_room(caller.uid, uids).await?;
        Ok(self.deps.messaging.room_data(room_id).await?)
    }

    /// 发消息：限流 → 插件过滤 → 房间权限 → 落库 → 通知在线成员
    ///
    /// 通知与在线状态刷新是尽力而为的副作用，消息已落库后失败只记日志。
    pub async fn post(
        &self,
        caller: &Caller,
        request: PostMessageRequest,
    ) -> Result<ChatMessage, ApplicationError> {
        self.check_rate_limit(caller)?;

        // 插件可以改写目标房间与内容
        let filtered = self
            .deps
            .hooks
            .filter_outgoing(OutgoingMessage {
                uid: caller.uid,
                room_id: RoomId::from(request.room_id),
                content: request.message,
            })
            .await?;

        self.deps
            .messaging
            .can_message_room(caller.uid, filtered.room_id)
            .await?;

        let content = MessageContent::new(filtered.content)?;
        let message = self
            .deps
            .messaging
            .send_message(MessageDraft {
                sender_id: caller.uid,
                room_id: filtered.room_id,
                content,
                timestamp: self.deps.clock.now(),
                ip: caller.ip.clone(),
            })
            .await?;

        if let Err(err) = self
            .deps
            .messaging
            .notify_users_in_room(caller.uid, filtered.room_id, message.clone())
            .await
        {
            tracing::warn!(
                room_id = %filtered.room_id,
                message_id = %message.id,
                error = %err,
                "消息已落库，房间内推送失败"
            );
        }

        if let Err(err) = self.deps.users.mark_online(caller.uid).await {
            tracing::warn!(uid = %caller.uid, error = %err, "刷新在线状态失败");
        }

        Ok(message)
    }

    /// 改名：改名 → 取全量成员 → 广播改名事件 → 返回调用者视角的房间
    pub async fn rename(
        &self,
        caller: &Caller,
        request: RenameRoomRequest,
    ) -> Result<RoomData, ApplicationError> {
        let room_id = RoomId::from(request.room_id);
        let name = RoomName::parse(request.name)?;

        self.deps
            .messaging
            .rename_room(caller.uid, room_id, name.clone())
            .await?;

        let uids = self.deps.messaging.uids_in_room(room_id).await?;
        let event = RoomRenameEvent {
            room_id,
            new_name: name.escaped(),
        };
        let payload = serde_json::to_value(&event)
            .map_err(|err| crate::notifier::NotifyError::failed(err.to_string()))?;
        self.deps
            .notifier
            .emit_to_uids(EVENT_ROOM_RENAME.to_string(), payload, uids)
            .await?;

        Ok(self.deps.messaging.load_room(caller.uid, room_id).await?)
    }

    /// 成员列表：并发取房主判定与成员，逐个计算 can_kick 投影
    pub async fn users(
        &self,
        caller: &Caller,
        room_id: Uuid,
    ) -> Result<Vec<RoomUser>, ApplicationError> {
        let room_id = RoomId::from(room_id);

        let (is_owner, members) = tokio::join!(
            self.deps.messaging.is_room_owner(caller.uid, room_id),
            self.deps.messaging.users_in_room(room_id),
        );
        let is_owner = is_owner?;
        let members = members?;

        Ok(members
            .into_iter()
            .map(|member| RoomUser {
                can_kick: is_owner && member.uid != caller.uid,
                uid: member.uid,
                username: member.username,
            })
            .collect())
    }

    /// 邀请：容量检查 → 存在性检查 → 可否私聊检查 → 入房 → 返回成员列表
    pub async fn invite(
        &self,
        caller: &Caller,
        request: InviteUsersRequest,
    ) -> Result<Vec<RoomUser>, ApplicationError> {
        let room_id = RoomId::from(request.room_id);
        let uids = Self::require_uids(request.uids)?;

        if let Some(max_users) = self.deps.max_room_users {
            let user_count = self.deps.messaging.user_count_in_room(room_id).await?;
            if user_count >= max_users {
                return Err(ChatError::CannotAddMoreUsers.into());
            }
        }

        self.ensure_users_exist(&uids).await?;

        try_join_all(
            uids.iter()
                .map(|&uid| self.deps.messaging.can_message_user(caller.uid, uid)),
        )
        .await?;

        self.deps
            .messaging
            .add_users_to_room(caller.uid, uids, room_id)
            .await?;

        self.users(caller, request.room_id).await
    }

    /// 踢出：存在性检查 → 单个目标且是自己时走退出路径，否则走移除路径
    pub async fn kick(
        &self,
        caller: &Caller,
        request: KickUsersRequest,
    ) -> Result<Vec<RoomUser>, ApplicationError> {
        let room_id = RoomId::from(request.room_id);
        let uids = Self::require_uids(request.uids)?;

        self.ensure_users_exist(&uids).await?;

        if uids.len() == 1 && uids[0] == caller.uid {
            self.deps
                .messaging
                .leave_room(vec![caller.uid], room_id)
                .await?;
        } else {
            self.deps
                .messaging
                .remove_users_from_room(caller.uid, uids, room_id)
                .await?;
        }

        self.users(caller, request.room_id).await
    }

    async fn ensure_users_exist(&self, uids: &[UserId]) -> Result<(), ApplicationError> {
        let exists = self.deps.users.exists(uids.to_vec()).await?;
        if exists.len() != uids.len() || !exists.iter().all(|present| *present) {
            return Err(ChatError::NoUser.into());
        }
        Ok(())
    }
}
