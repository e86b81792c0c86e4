mod chats_service;
#[cfg(test)]
mod chats_service_tests;

pub use chats_service::{
    ChatsService, ChatsServiceDependencies, CreateRoomRequest, InviteUsersRequest,
    KickUsersRequest, PostMessageRequest, RenameRoomRequest,
};
