use super::prelude::*;

#[derive(Default)]
pub struct SocialMutations;

#[Object]
impl SocialMutations {
    /// Befriend another hiker. Only this direction is recorded; the other
    /// hiker adding back creates a second row.
    async fn add_friend(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikerID")] hiker_id: i64,
        #[graphql(name = "friendID")] friend_id: i64,
    ) -> Result<AddFriendPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.hikers()
            .get_by_id(hiker_id)
            .await
            .or_not_found("Hiker", hiker_id)
            .into_gql()?;
        db.hikers()
            .get_by_id(friend_id)
            .await
            .or_not_found("Hiker", friend_id)
            .into_gql()?;

        let record = db.friends().create(hiker_id, friend_id).await.into_gql()?;

        tracing::info!(hiker_id, friend_id, "Friend added");

        Ok(Friend::from(record).into())
    }

    /// Send a direct message, timestamped now
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikerID")] hiker_id: i64,
        #[graphql(name = "recipientID")] recipient_id: i64,
        content: String,
    ) -> Result<SendMessagePayload> {
        let db = ctx.data_unchecked::<Database>();
        db.hikers()
            .get_by_id(hiker_id)
            .await
            .or_not_found("Hiker", hiker_id)
            .into_gql()?;
        db.hikers()
            .get_by_id(recipient_id)
            .await
            .or_not_found("Hiker", recipient_id)
            .into_gql()?;

        let record = db
            .messages()
            .create(CreateMessage {
                sender_id: hiker_id,
                recipient_id,
                content,
                time_sent: now_utc(),
            })
            .await
            .into_gql()?;

        tracing::info!(message_id = record.id, hiker_id, recipient_id, "Message sent");

        Ok(Message::from(record).into())
    }
}
