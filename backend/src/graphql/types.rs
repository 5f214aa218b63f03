//! GraphQL object types
//!
//! Scalar columns are plain `SimpleObject` fields. Foreign keys are kept out
//! of the schema and exposed as resolvers returning the referenced object,
//! under the field names clients already use (`trailID`, `hikerID`, ...).

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Result, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use trailhead_macros::mutation_payload;

use crate::db::{
    BuddyRecord, Database, EquipmentTypeRecord, EquipmentUsedRecord, FriendRecord, HikeRecord,
    HikerRecord, MessageRecord, ReviewedHikeRecord, SuggestedEquipmentRecord, TagRecord,
    ThreadMessageRecord, TrailRecord, TrailStatsRecord, UserRecord,
};
use crate::graphql::error::{ApiError, GqlResultExt, OrNotFound};
use crate::graphql::loaders::{EquipmentTypeLoader, HikeLoader, HikerLoader, TrailLoader};

// ============================================================================
// Reference helpers
// ============================================================================

async fn load_hiker(ctx: &Context<'_>, id: i64) -> Result<Hiker> {
    let loader = ctx.data_unchecked::<DataLoader<HikerLoader>>();
    loader
        .load_one(id)
        .await
        .map_err(anyhow::Error::from)
        .into_gql()?
        .map(Hiker::from)
        .ok_or(ApiError::not_found("Hiker", id))
        .into_gql()
}

async fn load_trail(ctx: &Context<'_>, id: i64) -> Result<Trail> {
    let loader = ctx.data_unchecked::<DataLoader<TrailLoader>>();
    loader
        .load_one(id)
        .await
        .map_err(anyhow::Error::from)
        .into_gql()?
        .map(Trail::from)
        .ok_or(ApiError::not_found("Trail", id))
        .into_gql()
}

async fn load_hike(ctx: &Context<'_>, id: i64) -> Result<Hike> {
    let loader = ctx.data_unchecked::<DataLoader<HikeLoader>>();
    loader
        .load_one(id)
        .await
        .map_err(anyhow::Error::from)
        .into_gql()?
        .map(Hike::from)
        .ok_or(ApiError::not_found("Hike", id))
        .into_gql()
}

async fn load_equipment_type(ctx: &Context<'_>, id: i64) -> Result<EquipmentType> {
    let loader = ctx.data_unchecked::<DataLoader<EquipmentTypeLoader>>();
    loader
        .load_one(id)
        .await
        .map_err(anyhow::Error::from)
        .into_gql()?
        .map(EquipmentType::from)
        .ok_or(ApiError::not_found("Equipment type", id))
        .into_gql()
}

// ============================================================================
// Trails
// ============================================================================

/// Hike aggregates already computed by the query that produced a trail
#[derive(Debug, Clone)]
pub struct TrailStats {
    pub num_hikes: i64,
    pub avg_difficulty: Option<f64>,
    pub avg_enjoyability: Option<f64>,
}

/// A hiking trail
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Trail {
    pub id: i64,
    pub name: String,
    /// Property (park, forest) the trail belongs to
    pub prop: String,
    pub city: String,
    pub state: String,
    pub description: String,
    pub is_open: bool,
    pub altitude_change: i64,
    pub distance: i64,
    pub fee: f64,
    /// Path of the trail image below /media
    pub image: Option<String>,
    #[graphql(skip)]
    pub stats: Option<TrailStats>,
}

impl From<TrailRecord> for Trail {
    fn from(r: TrailRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            prop: r.prop,
            city: r.city,
            state: r.state,
            description: r.description,
            is_open: r.is_open,
            altitude_change: r.altitude_change,
            distance: r.distance,
            fee: r.fee,
            image: r.image,
            stats: None,
        }
    }
}

impl From<TrailStatsRecord> for Trail {
    fn from(r: TrailStatsRecord) -> Self {
        Self {
            stats: Some(TrailStats {
                num_hikes: r.num_hikes,
                avg_difficulty: r.avg_difficulty,
                avg_enjoyability: r.avg_enjoyability,
            }),
            ..Trail::from(r.trail)
        }
    }
}

impl Trail {
    async fn resolve_stats(&self, ctx: &Context<'_>) -> Result<TrailStats> {
        if let Some(stats) = &self.stats {
            return Ok(stats.clone());
        }

        let db = ctx.data_unchecked::<Database>();
        let record = db
            .trails()
            .get_stats(self.id)
            .await
            .or_not_found("Trail", self.id)
            .into_gql()?;
        Ok(TrailStats {
            num_hikes: record.num_hikes,
            avg_difficulty: record.avg_difficulty,
            avg_enjoyability: record.avg_enjoyability,
        })
    }
}

#[ComplexObject]
impl Trail {
    /// Number of hikes recorded on this trail
    async fn num_hikes(&self, ctx: &Context<'_>) -> Result<i64> {
        Ok(self.resolve_stats(ctx).await?.num_hikes)
    }

    /// Mean difficulty rating, null when nobody has rated it
    async fn avg_difficulty(&self, ctx: &Context<'_>) -> Result<Option<f64>> {
        Ok(self.resolve_stats(ctx).await?.avg_difficulty)
    }

    /// Mean enjoyability rating, null when nobody has rated it
    async fn avg_enjoyability(&self, ctx: &Context<'_>) -> Result<Option<f64>> {
        Ok(self.resolve_stats(ctx).await?.avg_enjoyability)
    }

    async fn hikes(&self, ctx: &Context<'_>) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.hikes().list_by_trail(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Hike::from).collect())
    }

    async fn suggested_equipment(&self, ctx: &Context<'_>) -> Result<Vec<SuggestedEquipment>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .equipment()
            .list_suggested_for_trail(self.id)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(SuggestedEquipment::from).collect())
    }

    async fn tags(&self, ctx: &Context<'_>) -> Result<Vec<Tag>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.tags().list_by_trail(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Tag::from).collect())
    }
}

// ============================================================================
// Hikes
// ============================================================================

/// One visit of a hiker to a trail
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Hike {
    pub id: i64,
    #[graphql(skip)]
    pub trail_id: i64,
    #[graphql(skip)]
    pub hiker_id: i64,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: Option<DateTime<Utc>>,
    pub review: Option<String>,
    pub difficulty: Option<i64>,
    pub enjoyability: Option<i64>,
    /// Set when the producing query already summed the hiker's distance
    #[graphql(skip)]
    pub known_hiker_distance: Option<i64>,
}

impl From<HikeRecord> for Hike {
    fn from(r: HikeRecord) -> Self {
        Self {
            id: r.id,
            trail_id: r.trail_id,
            hiker_id: r.hiker_id,
            check_in_date: r.check_in_date,
            check_out_date: r.check_out_date,
            review: r.review,
            difficulty: r.difficulty,
            enjoyability: r.enjoyability,
            known_hiker_distance: None,
        }
    }
}

impl From<ReviewedHikeRecord> for Hike {
    fn from(r: ReviewedHikeRecord) -> Self {
        Self {
            known_hiker_distance: Some(r.total_hiker_distance),
            ..Hike::from(r.hike)
        }
    }
}

#[ComplexObject]
impl Hike {
    async fn trail(&self, ctx: &Context<'_>) -> Result<Trail> {
        load_trail(ctx, self.trail_id).await
    }

    async fn hiker(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.hiker_id).await
    }

    /// Calendar date (UTC) of the check-in
    async fn date(&self) -> NaiveDate {
        self.check_in_date.date_naive()
    }

    /// Sum of trail distances over every hike of this hike's hiker
    async fn total_hiker_distance(&self, ctx: &Context<'_>) -> Result<i64> {
        if let Some(total) = self.known_hiker_distance {
            return Ok(total);
        }
        let db = ctx.data_unchecked::<Database>();
        db.hikes()
            .total_distance_for_hiker(self.hiker_id)
            .await
            .into_gql()
    }

    async fn buddies(&self, ctx: &Context<'_>) -> Result<Vec<Buddy>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.buddies().list_by_hike(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Buddy::from).collect())
    }

    async fn equipment_used(&self, ctx: &Context<'_>) -> Result<Vec<EquipmentUsed>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.equipment().list_used_on_hike(self.id).await.into_gql()?;
        Ok(records.into_iter().map(EquipmentUsed::from).collect())
    }
}

// ============================================================================
// Hikers and users
// ============================================================================

/// User account behind a hiker
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
        }
    }
}

/// The app-side profile of a user
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Hiker {
    pub id: i64,
    #[graphql(skip)]
    pub user_id: i64,
}

impl From<HikerRecord> for Hiker {
    fn from(r: HikerRecord) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
        }
    }
}

#[ComplexObject]
impl Hiker {
    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        let db = ctx.data_unchecked::<Database>();
        db.users()
            .get_by_id(self.user_id)
            .await
            .or_not_found("User", self.user_id)
            .map(User::from)
            .into_gql()
    }

    async fn hikes(&self, ctx: &Context<'_>) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.hikes().list_by_hiker(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Hike::from).collect())
    }

    async fn messages_sent(&self, ctx: &Context<'_>) -> Result<Vec<Message>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.messages().list_sent(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Message::from).collect())
    }

    async fn messages_received(&self, ctx: &Context<'_>) -> Result<Vec<Message>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.messages().list_received(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Message::from).collect())
    }

    /// Hikers this hiker has befriended
    async fn friends(&self, ctx: &Context<'_>) -> Result<Vec<Friend>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.friends().list_by_hiker(self.id).await.into_gql()?;
        Ok(records.into_iter().map(Friend::from).collect())
    }
}

// ============================================================================
// Equipment and tags
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
pub struct EquipmentType {
    pub id: i64,
    pub equ_type: String,
}

impl From<EquipmentTypeRecord> for EquipmentType {
    fn from(r: EquipmentTypeRecord) -> Self {
        Self {
            id: r.id,
            equ_type: r.equ_type,
        }
    }
}

/// Equipment type recommended for a trail
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct SuggestedEquipment {
    pub id: i64,
    #[graphql(skip)]
    pub trail_id: i64,
    #[graphql(skip)]
    pub equipment_type_id: i64,
}

impl From<SuggestedEquipmentRecord> for SuggestedEquipment {
    fn from(r: SuggestedEquipmentRecord) -> Self {
        Self {
            id: r.id,
            trail_id: r.trail_id,
            equipment_type_id: r.equipment_type_id,
        }
    }
}

#[ComplexObject]
impl SuggestedEquipment {
    #[graphql(name = "trailID")]
    async fn trail(&self, ctx: &Context<'_>) -> Result<Trail> {
        load_trail(ctx, self.trail_id).await
    }

    #[graphql(name = "equipmentTypeID")]
    async fn equipment_type(&self, ctx: &Context<'_>) -> Result<EquipmentType> {
        load_equipment_type(ctx, self.equipment_type_id).await
    }
}

/// Equipment type carried on a hike
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct EquipmentUsed {
    pub id: i64,
    #[graphql(skip)]
    pub hike_id: i64,
    #[graphql(skip)]
    pub equipment_id: i64,
}

impl From<EquipmentUsedRecord> for EquipmentUsed {
    fn from(r: EquipmentUsedRecord) -> Self {
        Self {
            id: r.id,
            hike_id: r.hike_id,
            equipment_id: r.equipment_id,
        }
    }
}

#[ComplexObject]
impl EquipmentUsed {
    #[graphql(name = "hikeID")]
    async fn hike(&self, ctx: &Context<'_>) -> Result<Hike> {
        load_hike(ctx, self.hike_id).await
    }

    #[graphql(name = "equipmentID")]
    async fn equipment(&self, ctx: &Context<'_>) -> Result<EquipmentType> {
        load_equipment_type(ctx, self.equipment_id).await
    }
}

/// Free-text label on a trail
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Tag {
    pub id: i64,
    #[graphql(skip)]
    pub trail_id: i64,
    pub tag: String,
}

impl From<TagRecord> for Tag {
    fn from(r: TagRecord) -> Self {
        Self {
            id: r.id,
            trail_id: r.trail_id,
            tag: r.tag,
        }
    }
}

#[ComplexObject]
impl Tag {
    #[graphql(name = "trailID")]
    async fn trail(&self, ctx: &Context<'_>) -> Result<Trail> {
        load_trail(ctx, self.trail_id).await
    }
}

// ============================================================================
// Social
// ============================================================================

/// Another hiker who came along on a hike
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Buddy {
    pub id: i64,
    #[graphql(skip)]
    pub hike_id: i64,
    #[graphql(skip)]
    pub friend_id: i64,
}

impl From<BuddyRecord> for Buddy {
    fn from(r: BuddyRecord) -> Self {
        Self {
            id: r.id,
            hike_id: r.hike_id,
            friend_id: r.friend_id,
        }
    }
}

#[ComplexObject]
impl Buddy {
    #[graphql(name = "hikeID")]
    async fn hike(&self, ctx: &Context<'_>) -> Result<Hike> {
        load_hike(ctx, self.hike_id).await
    }

    #[graphql(name = "friendID")]
    async fn friend(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.friend_id).await
    }
}

/// One direction of a friendship
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Friend {
    pub id: i64,
    #[graphql(skip)]
    pub hiker_id: i64,
    #[graphql(skip)]
    pub friend_id: i64,
    pub friended_back: bool,
}

impl From<FriendRecord> for Friend {
    fn from(r: FriendRecord) -> Self {
        Self {
            id: r.id,
            hiker_id: r.hiker_id,
            friend_id: r.friend_id,
            friended_back: r.friended_back,
        }
    }
}

#[ComplexObject]
impl Friend {
    #[graphql(name = "hikerID")]
    async fn hiker(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.hiker_id).await
    }

    #[graphql(name = "friendID")]
    async fn friend(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.friend_id).await
    }

    /// Whether the friend has added this hiker back
    async fn is_mutual(&self, ctx: &Context<'_>) -> Result<bool> {
        let db = ctx.data_unchecked::<Database>();
        db.friends()
            .exists(self.friend_id, self.hiker_id)
            .await
            .into_gql()
    }
}

/// A direct message between two hikers
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Message {
    pub id: i64,
    #[graphql(skip)]
    pub sender_id: i64,
    #[graphql(skip)]
    pub recipient_id: i64,
    pub content: String,
    pub time_sent: DateTime<Utc>,
    /// Latest message from this message's sender to its recipient. Only set
    /// on conversation thread listings.
    pub most_recent_sent: Option<DateTime<Utc>>,
    /// Latest message from the recipient back to the sender. Only set on
    /// conversation thread listings.
    pub most_recent_received: Option<DateTime<Utc>>,
}

impl From<MessageRecord> for Message {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            recipient_id: r.recipient_id,
            content: r.content,
            time_sent: r.time_sent,
            most_recent_sent: None,
            most_recent_received: None,
        }
    }
}

impl From<ThreadMessageRecord> for Message {
    fn from(r: ThreadMessageRecord) -> Self {
        Self {
            most_recent_sent: r.most_recent_sent,
            most_recent_received: r.most_recent_received,
            ..Message::from(r.message)
        }
    }
}

#[ComplexObject]
impl Message {
    /// The sender
    #[graphql(name = "hikerID")]
    async fn sender(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.sender_id).await
    }

    #[graphql(name = "recipientID")]
    async fn recipient(&self, ctx: &Context<'_>) -> Result<Hiker> {
        load_hiker(ctx, self.recipient_id).await
    }

    /// Later of mostRecentSent and mostRecentReceived, ignoring nulls
    async fn most_recent_thread_activity(&self) -> Option<DateTime<Utc>> {
        self.most_recent_sent.max(self.most_recent_received)
    }
}

// ============================================================================
// Mutation payloads
// ============================================================================

mutation_payload!(CreateTrailPayload, trail: Trail);
mutation_payload!(CheckOutPayload, hike: Hike);
mutation_payload!(LeaveReviewPayload, hike: Hike);
mutation_payload!(CreateSuggestedEquipmentPayload, suggested_equipment: SuggestedEquipment);
mutation_payload!(CreateTagPayload, tag: Tag);
mutation_payload!(AddFriendPayload, friend: Friend);
mutation_payload!(SendMessagePayload, message: Message);
mutation_payload!(CreateEquipmentTypePayload, equipment_type: EquipmentType);
mutation_payload!(AddBuddyPayload, buddy: Buddy);
mutation_payload!(AddEquipmentUsedPayload, equipment_used: EquipmentUsed);

/// Result of checking in: the new hike and its check-in date
#[derive(Debug, Clone, SimpleObject)]
pub struct CheckInPayload {
    pub hike: Hike,
    pub date: NaiveDate,
}

impl From<Hike> for CheckInPayload {
    fn from(hike: Hike) -> Self {
        Self {
            date: hike.check_in_date.date_naive(),
            hike,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_check_in_payload_date() {
        let hike = Hike {
            id: 1,
            trail_id: 1,
            hiker_id: 1,
            check_in_date: Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap(),
            check_out_date: None,
            review: None,
            difficulty: None,
            enjoyability: None,
            known_hiker_distance: None,
        };
        let payload = CheckInPayload::from(hike);
        assert_eq!(payload.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }
}
