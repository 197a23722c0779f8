//! The one door into rooms and messages.
//!
//! Every room-scoped operation starts at [`Gateway::authorize`], which answers
//! a single question: is there a membership row for this user and this room?
//! The storage components never ask it themselves and are not reachable from
//! outside the crate.

use std::sync::Arc;

use email_address::EmailAddress;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::{
    auth::Credentials,
    db,
    error::{ChatError, ChatResult},
    model::{Membership, Message, Role, Room, RoomView, User},
    store::{codes::CodeGenerator, members, messages, rooms, users},
};

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_ROOM_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct Gateway {
    db_pool: SqlitePool,
    codes: Arc<dyn CodeGenerator>,
    credentials: Credentials,
}

impl Gateway {
    pub fn new(db_pool: SqlitePool, codes: Arc<dyn CodeGenerator>, credentials: Credentials) -> Self {
        Self { db_pool, codes, credentials }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> ChatResult<User> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(ChatError::validation("username must not be empty"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ChatError::validation(format!("username must be at most {MAX_USERNAME_LEN} characters")));
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(ChatError::validation(format!("email must be at most {MAX_EMAIL_LEN} characters")));
        }
        if !EmailAddress::is_valid(email) {
            return Err(ChatError::validation("email is not a valid email address"));
        }
        if password.is_empty() {
            return Err(ChatError::validation("password must not be empty"));
        }

        let credentials = self.credentials.clone();
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| ChatError::Internal(e.into()))??;

        let user = users::create(&self.db_pool, username, email, &password_hash).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Unknown username and wrong password look exactly the same from outside,
    /// down to the hashing work done before answering.
    pub async fn login(&self, username: &str, password: &str) -> ChatResult<User> {
        let user = users::find_by_username(&self.db_pool, username.trim()).await?;

        let credentials = self.credentials.clone();
        let password = password.to_owned();
        let password_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => credentials.decoy().to_owned(),
        };
        let verified = tokio::task::spawn_blocking(move || credentials.verify(&password, &password_hash))
            .await
            .map_err(|e| ChatError::Internal(e.into()))?;

        match user {
            Some(user) if verified => Ok(user),
            _ => Err(ChatError::InvalidCredentials),
        }
    }

    pub async fn user(&self, user_id: i64) -> ChatResult<Option<User>> {
        users::find_by_id(&self.db_pool, user_id).await
    }

    /// The membership check. Nonexistent rooms fail the same way as rooms the
    /// user is not in, so outsiders learn nothing about either.
    async fn authorize(&self, db: impl SqliteExecutor<'_>, user_id: i64, room_id: i64) -> ChatResult<Membership> {
        match members::find(db, user_id, room_id).await? {
            Some(membership) => Ok(membership),
            None => {
                debug!(user_id, room_id, "refused room access");
                Err(ChatError::NotAMember)
            }
        }
    }

    pub async fn is_member(&self, user_id: i64, room_id: i64) -> ChatResult<bool> {
        members::is_member(&self.db_pool, user_id, room_id).await
    }

    pub async fn rooms_for_user(&self, user_id: i64) -> ChatResult<Vec<Room>> {
        members::list_rooms_for_user(&self.db_pool, user_id).await
    }

    pub async fn create_and_join(&self, user_id: i64, name: &str) -> ChatResult<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::validation("room name must not be empty"));
        }
        if name.chars().count() > MAX_ROOM_NAME_LEN {
            return Err(ChatError::validation(format!("room name must be at most {MAX_ROOM_NAME_LEN} characters")));
        }

        rooms::create_room(&self.db_pool, self.codes.as_ref(), name, user_id).await
    }

    /// Joining a room you are already in (your own included) changes nothing.
    pub async fn join_by_code(&self, user_id: i64, code: &str) -> ChatResult<Room> {
        let Some(room) = rooms::find_by_code(&self.db_pool, code).await? else {
            return Err(ChatError::RoomNotFound);
        };

        let mut conn = self.db_pool.acquire().await?;
        let membership = members::join(&mut conn, user_id, room.id, Role::Member).await?;
        info!(user_id, room_id = room.id, role = ?membership.role, "joined room");
        Ok(room)
    }

    pub async fn view_room(&self, user_id: i64, room_id: i64) -> ChatResult<RoomView> {
        let mut tx = self.db_pool.begin().await?;
        self.authorize(&mut *tx, user_id, room_id).await?;

        let room = rooms::find_by_id(&mut *tx, room_id).await?.ok_or(ChatError::RoomNotFound)?;
        let messages = messages::list_for_room(&mut *tx, room_id).await?;
        tx.commit().await?;

        Ok(RoomView { room, messages })
    }

    pub async fn post_message(&self, user_id: i64, room_id: i64, content: &str) -> ChatResult<Message> {
        let mut tx = db::begin_write(&self.db_pool).await?;
        self.authorize(&mut *tx, user_id, room_id).await?;

        let message = messages::append(&mut *tx, room_id, user_id, content).await?;
        tx.commit().await?;

        Ok(message)
    }

    pub async fn members(&self, user_id: i64, room_id: i64) -> ChatResult<Vec<Membership>> {
        let mut tx = self.db_pool.begin().await?;
        self.authorize(&mut *tx, user_id, room_id).await?;

        let members = members::list_members(&mut *tx, room_id).await?;
        tx.commit().await?;

        Ok(members)
    }

    /// Authors may delete their own messages; room owners may delete any.
    pub async fn delete_message(&self, user_id: i64, message_id: i64) -> ChatResult<()> {
        let mut tx = db::begin_write(&self.db_pool).await?;

        let message = messages::find(&mut *tx, message_id).await?.ok_or(ChatError::MessageNotFound)?;
        let membership = self.authorize(&mut *tx, user_id, message.room_id).await?;
        if message.user_id != user_id && membership.role != Role::Owner {
            return Err(ChatError::PermissionDenied);
        }

        messages::delete(&mut *tx, message_id).await?;
        tx.commit().await?;

        info!(user_id, message_id, room_id = message.room_id, "message deleted");
        Ok(())
    }

    /// Owner only. Removes the room with all of its messages and memberships.
    pub async fn delete_room(&self, user_id: i64, room_id: i64) -> ChatResult<()> {
        let membership = self.authorize(&self.db_pool, user_id, room_id).await?;
        if membership.role != Role::Owner {
            return Err(ChatError::PermissionDenied);
        }

        rooms::delete_room(&self.db_pool, room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codes::RandomCodes;

    fn gateway_on(db_pool: SqlitePool) -> Gateway {
        Gateway::new(
            db_pool,
            Arc::new(RandomCodes::default()),
            Credentials::with_params(1024, 1, 1).unwrap(),
        )
    }

    async fn gateway() -> Gateway {
        gateway_on(db::memory().await.unwrap())
    }

    #[tokio::test]
    async fn register_and_login() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();

        assert_eq!(alice.username, "alice");
        assert_ne!(alice.password_hash, "pw1");

        let logged_in = gateway.login("alice", "pw1").await.unwrap();
        assert_eq!(logged_in.id, alice.id);
        assert_eq!(gateway.user(alice.id).await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn bad_login_does_not_say_why() {
        let gateway = gateway().await;
        gateway.register("alice", "alice@x.com", "pw1").await.unwrap();

        let wrong_password = gateway.login("alice", "nope").await.unwrap_err();
        let unknown_user = gateway.login("mallory", "pw1").await.unwrap_err();

        assert!(matches!(wrong_password, ChatError::InvalidCredentials));
        assert!(matches!(unknown_user, ChatError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn registration_validation() {
        let gateway = gateway().await;

        for (username, email, password) in [
            ("", "a@x.com", "pw"),
            ("   ", "a@x.com", "pw"),
            (&"u".repeat(51) as &str, "a@x.com", "pw"),
            ("alice", "not-an-email", "pw"),
            ("alice", &format!("{}@x.com", "e".repeat(95)) as &str, "pw"),
            ("alice", "a@x.com", ""),
        ] {
            let result = gateway.register(username, email, password).await;
            assert!(matches!(result, Err(ChatError::Validation(_))), "{username:?} {email:?} {password:?}");
        }

        gateway.register(&"u".repeat(50), "a@x.com", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_registration() {
        let gateway = gateway().await;
        gateway.register("alice", "alice@x.com", "pw1").await.unwrap();

        let result = gateway.register("alice", "elsewhere@x.com", "pw2").await;
        assert!(matches!(result, Err(ChatError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn general_room_scenario() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();

        assert_eq!(room.code.len(), 6);
        assert!(gateway.is_member(alice.id, room.id).await.unwrap());
        let members = gateway.members(alice.id, room.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Role::Owner);

        let bob = gateway.register("bob", "bob@x.com", "pw2").await.unwrap();
        let joined = gateway.join_by_code(bob.id, &room.code).await.unwrap();
        assert_eq!(joined.id, room.id);
        assert!(gateway.is_member(bob.id, room.id).await.unwrap());

        gateway.post_message(alice.id, room.id, "hello").await.unwrap();
        gateway.post_message(bob.id, room.id, "hi").await.unwrap();

        let view = gateway.view_room(bob.id, room.id).await.unwrap();
        assert_eq!(view.room, room);
        let contents: Vec<_> = view.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hi"]);
    }

    #[tokio::test]
    async fn join_by_code_twice_is_one_membership() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let bob = gateway.register("bob", "bob@x.com", "pw2").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();

        gateway.join_by_code(bob.id, &room.code).await.unwrap();
        gateway.join_by_code(bob.id, &room.code.to_lowercase()).await.unwrap();
        // the owner joining their own room stays the owner
        gateway.join_by_code(alice.id, &room.code).await.unwrap();

        let members = gateway.members(alice.id, room.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members.iter().filter(|m| m.user_id == bob.id).count(), 1);
        assert_eq!(members.iter().find(|m| m.user_id == alice.id).unwrap().role, Role::Owner);
    }

    #[tokio::test]
    async fn unknown_code() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();

        assert!(matches!(gateway.join_by_code(alice.id, "ZZZZZZ").await, Err(ChatError::RoomNotFound)));
    }

    #[tokio::test]
    async fn outsiders_are_kept_out() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let eve = gateway.register("eve", "eve@x.com", "pw3").await.unwrap();
        let room = gateway.create_and_join(alice.id, "Secret").await.unwrap();

        assert!(matches!(gateway.post_message(eve.id, room.id, "hi").await, Err(ChatError::NotAMember)));
        assert!(matches!(gateway.view_room(eve.id, room.id).await, Err(ChatError::NotAMember)));
        assert!(matches!(gateway.members(eve.id, room.id).await, Err(ChatError::NotAMember)));
        assert!(matches!(gateway.delete_room(eve.id, room.id).await, Err(ChatError::NotAMember)));

        // a room that does not exist looks the same as one you are not in
        assert!(matches!(gateway.view_room(eve.id, room.id + 100).await, Err(ChatError::NotAMember)));

        let message = gateway.post_message(alice.id, room.id, "hi").await.unwrap();
        assert_eq!(message.content, "hi");
        assert_eq!(message.room_id, room.id);
        assert!(matches!(gateway.delete_message(eve.id, message.id).await, Err(ChatError::NotAMember)));
    }

    #[tokio::test]
    async fn room_name_validation() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();

        assert!(matches!(gateway.create_and_join(alice.id, "  ").await, Err(ChatError::Validation(_))));
        assert!(matches!(
            gateway.create_and_join(alice.id, &"n".repeat(101)).await,
            Err(ChatError::Validation(_))
        ));
        assert!(gateway.rooms_for_user(alice.id).await.unwrap().is_empty());

        let room = gateway.create_and_join(alice.id, "  Padded  ").await.unwrap();
        assert_eq!(room.name, "Padded");
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();

        assert!(matches!(gateway.post_message(alice.id, room.id, "").await, Err(ChatError::Validation(_))));
    }

    #[tokio::test]
    async fn message_deletion_rules() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let bob = gateway.register("bob", "bob@x.com", "pw2").await.unwrap();
        let carol = gateway.register("carol", "carol@x.com", "pw3").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();
        gateway.join_by_code(bob.id, &room.code).await.unwrap();
        gateway.join_by_code(carol.id, &room.code).await.unwrap();

        let bobs = gateway.post_message(bob.id, room.id, "bob's").await.unwrap();
        let carols = gateway.post_message(carol.id, room.id, "carol's").await.unwrap();

        // members can't delete each other's messages
        assert!(matches!(gateway.delete_message(bob.id, carols.id).await, Err(ChatError::PermissionDenied)));
        // authors can delete their own, owners can delete anyone's
        gateway.delete_message(bob.id, bobs.id).await.unwrap();
        gateway.delete_message(alice.id, carols.id).await.unwrap();

        assert!(gateway.view_room(alice.id, room.id).await.unwrap().messages.is_empty());
        assert!(matches!(gateway.delete_message(alice.id, carols.id).await, Err(ChatError::MessageNotFound)));
    }

    #[tokio::test]
    async fn only_owner_deletes_room() {
        let gateway = gateway().await;
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let bob = gateway.register("bob", "bob@x.com", "pw2").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();
        gateway.join_by_code(bob.id, &room.code).await.unwrap();
        gateway.post_message(bob.id, room.id, "hi").await.unwrap();

        assert!(matches!(gateway.delete_room(bob.id, room.id).await, Err(ChatError::PermissionDenied)));

        gateway.delete_room(alice.id, room.id).await.unwrap();

        assert!(!gateway.is_member(bob.id, room.id).await.unwrap());
        assert!(gateway.rooms_for_user(alice.id).await.unwrap().is_empty());
        assert!(matches!(gateway.view_room(alice.id, room.id).await, Err(ChatError::NotAMember)));
        assert!(matches!(gateway.join_by_code(bob.id, &room.code).await, Err(ChatError::RoomNotFound)));
        assert!(messages::list_for_room(&gateway.db_pool, room.id).await.unwrap().is_empty());
        assert_eq!(rooms::find_by_id(&gateway.db_pool, room.id).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_posts_all_land() {
        let (_dir, db_pool) = db::tests::on_disk().await;
        let gateway = gateway_on(db_pool);
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();
        let room_id = room.id;
        let mut posters = vec![alice.id];
        for name in ["bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan"] {
            let user = gateway.register(name, &format!("{name}@x.com"), "pw").await.unwrap();
            gateway.join_by_code(user.id, &room.code).await.unwrap();
            posters.push(user.id);
        }

        let tasks: Vec<_> = (0..400)
            .map(|i| {
                let gateway = gateway.clone();
                let user_id = posters[i % posters.len()];
                tokio::spawn(async move { gateway.post_message(user_id, room_id, &format!("message {i}")).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let history = gateway.view_room(alice.id, room.id).await.unwrap().messages;
        assert_eq!(history.len(), 400);
        assert!(history.windows(2).all(|w| (w[0].created_at, w[0].id) < (w[1].created_at, w[1].id)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_and_posts() {
        let (_dir, db_pool) = db::tests::on_disk().await;
        let gateway = gateway_on(db_pool);
        let alice = gateway.register("alice", "alice@x.com", "pw1").await.unwrap();
        let bob = gateway.register("bob", "bob@x.com", "pw2").await.unwrap();
        let room = gateway.create_and_join(alice.id, "General").await.unwrap();
        gateway.join_by_code(bob.id, &room.code).await.unwrap();
        let room_id = room.id;

        let mut doomed = Vec::new();
        for i in 0..50 {
            doomed.push(gateway.post_message(bob.id, room.id, &format!("old {i}")).await.unwrap().id);
        }

        // bob deletes their own, alice deletes as owner, both keep posting
        let mut tasks = Vec::new();
        for (i, message_id) in doomed.into_iter().enumerate() {
            let deleter = if i % 2 == 0 { bob.id } else { alice.id };
            let gateway_for_delete = gateway.clone();
            tasks.push(tokio::spawn(async move { gateway_for_delete.delete_message(deleter, message_id).await }));
            let gateway_for_post = gateway.clone();
            tasks.push(tokio::spawn(async move {
                gateway_for_post.post_message(deleter, room_id, &format!("new {i}")).await.map(|_| ())
            }));
        }

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let history = gateway.view_room(bob.id, room.id).await.unwrap().messages;
        assert_eq!(history.len(), 50);
        assert!(history.iter().all(|m| m.content.starts_with("new ")));
    }
}
