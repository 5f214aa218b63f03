use super::prelude::*;

/// Trails returned by the beginner and popular rankings
const TRAIL_RANKING_LIMIT: i64 = 15;

#[derive(Default)]
pub struct TrailQueries;

#[Object]
impl TrailQueries {
    /// Trails whose name, property, city or state contains `search`
    /// (case-insensitive). No term, or an empty one, lists every trail.
    async fn trails(&self, ctx: &Context<'_>, search: Option<String>) -> Result<Vec<Trail>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.trails().search(search.as_deref()).await.into_gql()?;
        Ok(records.into_iter().map(Trail::from).collect())
    }

    /// Easiest trails by average difficulty; unrated trails come last
    async fn beginner_trails(&self, ctx: &Context<'_>) -> Result<Vec<Trail>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .trails()
            .list_easiest(TRAIL_RANKING_LIMIT)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Trail::from).collect())
    }

    /// Most hiked trails
    async fn popular_trails(&self, ctx: &Context<'_>) -> Result<Vec<Trail>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .trails()
            .list_most_hiked(TRAIL_RANKING_LIMIT)
            .await
            .into_gql()?;
        Ok(records.into_iter().map(Trail::from).collect())
    }

    /// A single trail with its hike aggregates, as a list of zero or one
    async fn trail_details(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
    ) -> Result<Vec<Trail>> {
        let db = ctx.data_unchecked::<Database>();
        let record = db.trails().get_stats(trail_id).await.into_gql()?;
        Ok(record.into_iter().map(Trail::from).collect())
    }
}
