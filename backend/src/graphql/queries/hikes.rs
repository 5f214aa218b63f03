use super::prelude::*;

/// Reviews returned by expertReviews
const EXPERT_REVIEW_LIMIT: i64 = 5;

#[derive(Default)]
pub struct HikeQueries;

#[Object]
impl HikeQueries {
    /// Every hike
    async fn hikes(&self, ctx: &Context<'_>) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.hikes().list_all().await.into_gql()?;
        Ok(records.into_iter().map(Hike::from).collect())
    }

    /// Reviews on a trail written by the hikers who have walked the furthest
    async fn expert_reviews(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
    ) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .hikes()
            .list_expert_reviews(trail_id, EXPERT_REVIEW_LIMIT)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Hike::from).collect())
    }

    /// Latest hike of each hiker who has been on the trail, newest first
    async fn recent_hikers(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
    ) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .hikes()
            .list_latest_per_hiker(trail_id)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Hike::from).collect())
    }

    async fn hike_detail(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikeID")] hike_id: i64,
    ) -> Result<Hike> {
        let db = ctx.data_unchecked::<Database>();
        db.hikes()
            .get_by_id(hike_id)
            .await
            .or_not_found("Hike", hike_id)
            .map(Hike::from)
            .into_gql()
    }

    /// The hiker's latest hike on a trail, as a list of zero or one. Without
    /// `hikerID` the logged-in user's hiker is used.
    async fn hiker_most_recent_hike_on_trail(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
        #[graphql(name = "hikerID")] hiker_id: Option<i64>,
    ) -> Result<Vec<Hike>> {
        let db = ctx.data_unchecked::<Database>();
        db.trails()
            .get_by_id(trail_id)
            .await
            .or_not_found("Trail", trail_id)
            .into_gql()?;
        let hiker = hiker_for_request(ctx, hiker_id).await.into_gql()?;

        let record = db
            .hikes()
            .get_latest_for_hiker_on_trail(hiker.id, trail_id)
            .await
            .into_gql()?;
        Ok(record.into_iter().map(Hike::from).collect())
    }
}
