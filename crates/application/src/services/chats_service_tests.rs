//! 聊天 API 服务单元测试
//!
//! 用 mock 的子系统端口验证六个操作的编排逻辑：限流、参数校验、
//! 踢出与退出的路由区分、邀请的容量与存在性检查、成员投影。

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    caller::{Caller, ChatSession},
    clock::SystemClock,
    error::ApplicationError,
    gateway::{
        GatewayError, MockMessagingGateway, MockUserGateway, RoomMemberRecord,
    },
    hooks::{MockMessageHooks, PassthroughHooks},
    notifier::{MockRealtimeNotifier, EVENT_ROOM_RENAME},
    rate_limiter::MessageRateLimiter,
    services::chats_service::*,
};
use domain::{
    ChatError, ChatMessage, MessageContent, MessageId, RoomData, RoomId, UserId,
};

fn test_caller() -> Caller {
    Caller::from_request(
        UserId::from(Uuid::new_v4()),
        Some("203.0.113.7".to_string()),
        Arc::new(ChatSession::new()),
    )
}

fn sample_room_data(room_id: RoomId, owner_id: UserId) -> RoomData {
    RoomData {
        room_id,
        owner_id,
        name: "General".to_string(),
        user_count: 2,
        created_at: Utc::now(),
    }
}

fn sample_message(room_id: RoomId, sender_id: UserId, content: &str) -> ChatMessage {
    ChatMessage {
        id: MessageId::from(Uuid::new_v4()),
        room_id,
        sender_id,
        content: MessageContent::new(content).unwrap(),
        timestamp: Utc::now(),
        ip: Some("203.0.113.7".to_string()),
    }
}

struct ServiceBuilder {
    messaging: MockMessagingGateway,
    users: MockUserGateway,
    hooks: Option<MockMessageHooks>,
    notifier: MockRealtimeNotifier,
    delay_millis: u64,
    max_room_users: Option<usize>,
}

impl ServiceBuilder {
    fn new() -> Self {
        Self {
            messaging: MockMessagingGateway::new(),
            users: MockUserGateway::new(),
            hooks: None,
            notifier: MockRealtimeNotifier::new(),
            delay_millis: 0,
            max_room_users: None,
        }
    }

    fn build(self) -> ChatsService {
        let clock = Arc::new(SystemClock);
        let hooks: Arc<dyn crate::hooks::MessageHooks> = match self.hooks {
            Some(mock) => Arc::new(mock),
            None => Arc::new(PassthroughHooks),
        };
        ChatsService::new(ChatsServiceDependencies {
            messaging: Arc::new(self.messaging),
            users: Arc::new(self.users),
            hooks,
            notifier: Arc::new(self.notifier),
            clock: clock.clone(),
            rate_limiter: Arc::new(MessageRateLimiter::new(self.delay_millis, clock)),
            max_room_users: self.max_room_users,
        })
    }
}

fn assert_chat_error(result: Result<impl std::fmt::Debug, ApplicationError>, expected: ChatError) {
    match result {
        Err(ApplicationError::Chat(err)) => assert_eq!(err, expected),
        other => panic!("expected chat error {expected:?}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_rejects_missing_uids() {
    let caller = test_caller();
    let service = ServiceBuilder::new().build();

    let result = service.create(&caller, CreateRoomRequest { uids: None }).await;

    assert_chat_error(
        result,
        ChatError::wrong_parameter_type("uids", "array", "null"),
    );
}

#[tokio::test]
async fn test_create_checks_each_target_then_returns_room_data() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let target_a = Uuid::new_v4();
    let target_b = Uuid::new_v4();
    let room_id = RoomId::from(Uuid::new_v4());

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_can_message_user()
        .times(2)
        .returning(|_, _| Ok(()));
    builder
        .messaging
        .expect_new_room()
        .withf(move |owner, invited| *owner == caller_uid && invited.len() == 2)
        .times(1)
        .returning(move |_, _| Ok(room_id));
    builder
        .messaging
        .expect_room_data()
        .times(1)
        .returning(move |id| Ok(sample_room_data(id, caller_uid)));

    let service = builder.build();
    let data = service
        .create(
            &caller,
            CreateRoomRequest {
                uids: Some(vec![target_a, target_b]),
            },
        )
        .await
        .unwrap();

    assert_eq!(data.room_id, room_id);
    assert_eq!(data.owner_id, caller_uid);
}

#[tokio::test]
async fn test_create_aborts_when_target_cannot_be_messaged() {
    let caller = test_caller();

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_can_message_user()
        .returning(|_, to| Err(GatewayError::UserNotFound(to)));
    builder.messaging.expect_new_room().never();

    let service = builder.build();
    let result = service
        .create(
            &caller,
            CreateRoomRequest {
                uids: Some(vec![Uuid::new_v4()]),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::Gateway(GatewayError::UserNotFound(_)))
    ));
}

#[tokio::test]
async fn test_post_second_message_within_delay_is_rate_limited() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let room_id = Uuid::new_v4();

    let mut builder = ServiceBuilder::new();
    builder.delay_millis = 60_000;
    builder
        .messaging
        .expect_can_message_room()
        .times(1)
        .returning(|_, _| Ok(()));
    builder
        .messaging
        .expect_send_message()
        .times(1)
        .returning(move |draft| Ok(sample_message(draft.room_id, caller_uid, draft.content.as_str())));
    builder
        .messaging
        .expect_notify_users_in_room()
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .users
        .expect_mark_online()
        .times(1)
        .returning(|_| Ok(()));

    let service = builder.build();

    service
        .post(
            &caller,
            PostMessageRequest {
                room_id,
                message: "first".to_string(),
            },
        )
        .await
        .unwrap();

    // 第二条消息落在延迟窗口内，必须被拒绝且不触达任何端口
    let result = service
        .post(
            &caller,
            PostMessageRequest {
                room_id,
                message: "second".to_string(),
            },
        )
        .await;
    assert_chat_error(result, ChatError::TooManyMessages);
}

#[tokio::test]
async fn test_post_sends_hook_filtered_content() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let room_id = Uuid::new_v4();

    let mut hooks = MockMessageHooks::new();
    hooks.expect_filter_outgoing().times(1).returning(|mut msg| {
        msg.content = format!("[filtered] {}", msg.content);
        Ok(msg)
    });

    let mut builder = ServiceBuilder::new();
    builder.hooks = Some(hooks);
    builder
        .messaging
        .expect_can_message_room()
        .returning(|_, _| Ok(()));
    builder
        .messaging
        .expect_send_message()
        .withf(|draft| draft.content.as_str() == "[filtered] hello")
        .times(1)
        .returning(move |draft| Ok(sample_message(draft.room_id, caller_uid, draft.content.as_str())));
    builder
        .messaging
        .expect_notify_users_in_room()
        .returning(|_, _, _| Ok(()));
    builder.users.expect_mark_online().returning(|_| Ok(()));

    let service = builder.build();
    let message = service
        .post(
            &caller,
            PostMessageRequest {
                room_id,
                message: "hello".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(message.content.as_str(), "[filtered] hello");
}

#[tokio::test]
async fn test_post_returns_message_even_when_notify_fails() {
    let caller = test_caller();
    let caller_uid = caller.uid;

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_can_message_room()
        .returning(|_, _| Ok(()));
    builder
        .messaging
        .expect_send_message()
        .returning(move |draft| Ok(sample_message(draft.room_id, caller_uid, draft.content.as_str())));
    builder
        .messaging
        .expect_notify_users_in_room()
        .returning(|_, _, _| Err(GatewayError::backend("fan-out down")));
    builder.users.expect_mark_online().returning(|_| Ok(()));

    let service = builder.build();
    let result = service
        .post(
            &caller,
            PostMessageRequest {
                room_id: Uuid::new_v4(),
                message: "still stored".to_string(),
            },
        )
        .await;

    // 消息已落库，推送失败不回滚
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_rename_broadcasts_escaped_name_to_room_members() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let room_id = Uuid::new_v4();
    let member = UserId::from(Uuid::new_v4());

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_rename_room()
        .withf(|_, _, name| name.as_str() == "<ops>")
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .messaging
        .expect_uids_in_room()
        .returning(move |_| Ok(vec![caller_uid, member]));
    builder
        .notifier
        .expect_emit_to_uids()
        .withf(move |event, payload, uids| {
            event == EVENT_ROOM_RENAME
                && payload["new_name"] == "&lt;ops&gt;"
                && uids.len() == 2
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .messaging
        .expect_load_room()
        .times(1)
        .returning(move |uid, id| Ok(sample_room_data(id, uid)));

    let service = builder.build();
    let data = service
        .rename(
            &caller,
            RenameRoomRequest {
                room_id,
                name: "<ops>".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(data.room_id, RoomId::from(room_id));
}

#[tokio::test]
async fn test_users_projection_marks_kickable_members_for_owner() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let other = UserId::from(Uuid::new_v4());

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(true));
    builder.messaging.expect_users_in_room().returning(move |_| {
        Ok(vec![
            RoomMemberRecord {
                uid: caller_uid,
                username: "caller".to_string(),
            },
            RoomMemberRecord {
                uid: other,
                username: "other".to_string(),
            },
        ])
    });

    let service = builder.build();
    let users = service.users(&caller, Uuid::new_v4()).await.unwrap();

    assert_eq!(users.len(), 2);
    // 房主不能踢自己，但能踢其他人
    assert!(!users.iter().find(|u| u.uid == caller_uid).unwrap().can_kick);
    assert!(users.iter().find(|u| u.uid == other).unwrap().can_kick);
}

#[tokio::test]
async fn test_users_projection_gives_no_kick_rights_to_non_owner() {
    let caller = test_caller();
    let other = UserId::from(Uuid::new_v4());

    let mut builder = ServiceBuilder::new();
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(false));
    builder.messaging.expect_users_in_room().returning(move |_| {
        Ok(vec![RoomMemberRecord {
            uid: other,
            username: "other".to_string(),
        }])
    });

    let service = builder.build();
    let users = service.users(&caller, Uuid::new_v4()).await.unwrap();

    assert!(users.iter().all(|u| !u.can_kick));
}

#[tokio::test]
async fn test_invite_rejects_when_room_is_full() {
    let caller = test_caller();

    let mut builder = ServiceBuilder::new();
    builder.max_room_users = Some(4);
    builder
        .messaging
        .expect_user_count_in_room()
        .returning(|_| Ok(4));
    builder.users.expect_exists().never();
    builder.messaging.expect_add_users_to_room().never();

    let service = builder.build();
    let result = service
        .invite(
            &caller,
            InviteUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![Uuid::new_v4()]),
            },
        )
        .await;

    assert_chat_error(result, ChatError::CannotAddMoreUsers);
}

#[tokio::test]
async fn test_invite_skips_capacity_check_when_unlimited() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let target = Uuid::new_v4();

    let mut builder = ServiceBuilder::new();
    builder.max_room_users = None;
    builder.messaging.expect_user_count_in_room().never();
    builder
        .users
        .expect_exists()
        .returning(|uids| Ok(vec![true; uids.len()]));
    builder
        .messaging
        .expect_can_message_user()
        .returning(|_, _| Ok(()));
    builder
        .messaging
        .expect_add_users_to_room()
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(true));
    builder.messaging.expect_users_in_room().returning(move |_| {
        Ok(vec![
            RoomMemberRecord {
                uid: caller_uid,
                username: "caller".to_string(),
            },
            RoomMemberRecord {
                uid: UserId::from(target),
                username: "invited".to_string(),
            },
        ])
    });

    let service = builder.build();
    let users = service
        .invite(
            &caller,
            InviteUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![target]),
            },
        )
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_invite_rejects_unknown_target() {
    let caller = test_caller();

    let mut builder = ServiceBuilder::new();
    builder
        .users
        .expect_exists()
        .returning(|_| Ok(vec![true, false]));
    builder.messaging.expect_can_message_user().never();
    builder.messaging.expect_add_users_to_room().never();

    let service = builder.build();
    let result = service
        .invite(
            &caller,
            InviteUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![Uuid::new_v4(), Uuid::new_v4()]),
            },
        )
        .await;

    assert_chat_error(result, ChatError::NoUser);
}

#[tokio::test]
async fn test_kick_single_self_target_routes_to_leave() {
    let caller = test_caller();
    let caller_uid = caller.uid;

    let mut builder = ServiceBuilder::new();
    builder
        .users
        .expect_exists()
        .returning(|uids| Ok(vec![true; uids.len()]));
    builder
        .messaging
        .expect_leave_room()
        .withf(move |uids, _| uids == &[caller_uid])
        .times(1)
        .returning(|_, _| Ok(()));
    builder.messaging.expect_remove_users_from_room().never();
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(false));
    builder
        .messaging
        .expect_users_in_room()
        .returning(|_| Ok(Vec::new()));

    let service = builder.build();
    let users = service
        .kick(
            &caller,
            KickUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![caller_uid.into()]),
            },
        )
        .await
        .unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_kick_other_target_routes_to_remove() {
    let caller = test_caller();
    let target = Uuid::new_v4();

    let mut builder = ServiceBuilder::new();
    builder
        .users
        .expect_exists()
        .returning(|uids| Ok(vec![true; uids.len()]));
    builder.messaging.expect_leave_room().never();
    builder
        .messaging
        .expect_remove_users_from_room()
        .withf(move |_, uids, _| uids == &[UserId::from(target)])
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(true));
    builder
        .messaging
        .expect_users_in_room()
        .returning(|_| Ok(Vec::new()));

    let service = builder.build();
    service
        .kick(
            &caller,
            KickUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![target]),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_kick_group_including_self_routes_to_remove() {
    let caller = test_caller();
    let caller_uid = caller.uid;
    let target = Uuid::new_v4();

    let mut builder = ServiceBuilder::new();
    builder
        .users
        .expect_exists()
        .returning(|uids| Ok(vec![true; uids.len()]));
    builder.messaging.expect_leave_room().never();
    builder
        .messaging
        .expect_remove_users_from_room()
        .withf(|_, uids, _| uids.len() == 2)
        .times(1)
        .returning(|_, _, _| Ok(()));
    builder
        .messaging
        .expect_is_room_owner()
        .returning(|_, _| Ok(true));
    builder
        .messaging
        .expect_users_in_room()
        .returning(|_| Ok(Vec::new()));

    let service = builder.build();
    service
        .kick(
            &caller,
            KickUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![caller_uid.into(), target]),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_kick_rejects_unknown_target() {
    let caller = test_caller();

    let mut builder = ServiceBuilder::new();
    builder.users.expect_exists().returning(|_| Ok(vec![false]));
    builder.messaging.expect_leave_room().never();
    builder.messaging.expect_remove_users_from_room().never();

    let service = builder.build();
    let result = service
        .kick(
            &caller,
            KickUsersRequest {
                room_id: Uuid::new_v4(),
                uids: Some(vec![Uuid::new_v4()]),
            },
        )
        .await;

    assert_chat_error(result, ChatError::NoUser);
}
