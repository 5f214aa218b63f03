use super::prelude::*;

#[derive(Default)]
pub struct MessageQueries;

#[Object]
impl MessageQueries {
    /// The latest message with each person the hiker has talked to, most
    /// recent conversation first
    async fn conversation_threads(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikerID")] hiker_id: i64,
    ) -> Result<Vec<Message>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .messages()
            .list_latest_per_thread(hiker_id)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Message::from).collect())
    }

    /// Every message between two hikers, newest first
    async fn thread_detail(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikerID")] hiker_id: i64,
        #[graphql(name = "recipientID")] recipient_id: i64,
    ) -> Result<Vec<Message>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .messages()
            .list_thread(hiker_id, recipient_id)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Message::from).collect())
    }
}
