use super::prelude::*;

#[derive(Default)]
pub struct HikeMutations;

#[Object]
impl HikeMutations {
    /// Start a hike on a trail now. Without `hikerID` the logged-in user's
    /// hiker checks in.
    async fn check_in(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
        #[graphql(name = "hikerID")] hiker_id: Option<i64>,
    ) -> Result<CheckInPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.trails()
            .get_by_id(trail_id)
            .await
            .or_not_found("Trail", trail_id)
            .into_gql()?;
        let hiker = hiker_for_request(ctx, hiker_id).await.into_gql()?;

        let record = db
            .hikes()
            .create(CreateHike {
                trail_id,
                hiker_id: hiker.id,
                check_in_date: now_utc(),
            })
            .await
            .into_gql()?;

        tracing::info!(hike_id = record.id, trail_id, hiker_id = hiker.id, "Checked in");

        Ok(Hike::from(record).into())
    }

    /// Finish a hike now. Without `hikeID` the logged-in user's latest hike
    /// on the trail is closed.
    async fn check_out(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
        #[graphql(name = "hikeID")] hike_id: Option<i64>,
    ) -> Result<CheckOutPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.trails()
            .get_by_id(trail_id)
            .await
            .or_not_found("Trail", trail_id)
            .into_gql()?;

        let hike = match hike_id {
            Some(id) => db.hikes().get_by_id(id).await.or_not_found("Hike", id),
            None => find_latest_hike(ctx, trail_id).await,
        }
        .into_gql()?;

        let record = db
            .hikes()
            .check_out(hike.id, now_utc())
            .await
            .or_not_found("Hike", hike.id)
            .into_gql()?;

        tracing::info!(hike_id = record.id, trail_id, "Checked out");

        Ok(Hike::from(record).into())
    }

    /// Review and rate a hike. Omitted fields keep their current value.
    async fn leave_review(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikeID")] hike_id: i64,
        review: Option<String>,
        difficulty: Option<i64>,
        enjoyability: Option<i64>,
    ) -> Result<LeaveReviewPayload> {
        let db = ctx.data_unchecked::<Database>();

        let record = db
            .hikes()
            .update_review(
                hike_id,
                UpdateReview {
                    review,
                    difficulty,
                    enjoyability,
                },
            )
            .await
            .or_not_found("Hike", hike_id)
            .into_gql()?;

        tracing::info!(
            hike_id,
            difficulty = ?record.difficulty,
            enjoyability = ?record.enjoyability,
            "Review left"
        );

        Ok(Hike::from(record).into())
    }

    /// Record another hiker as a buddy on a hike
    async fn add_buddy(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikeID")] hike_id: i64,
        #[graphql(name = "friendID")] friend_id: i64,
    ) -> Result<AddBuddyPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.hikes()
            .get_by_id(hike_id)
            .await
            .or_not_found("Hike", hike_id)
            .into_gql()?;
        db.hikers()
            .get_by_id(friend_id)
            .await
            .or_not_found("Hiker", friend_id)
            .into_gql()?;

        let record = db.buddies().create(hike_id, friend_id).await.into_gql()?;

        tracing::info!(hike_id, friend_id, "Buddy added");

        Ok(Buddy::from(record).into())
    }

    /// Record an equipment type carried on a hike
    async fn add_equipment_used(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "hikeID")] hike_id: i64,
        #[graphql(name = "equTypeID")] equ_type_id: i64,
    ) -> Result<AddEquipmentUsedPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.hikes()
            .get_by_id(hike_id)
            .await
            .or_not_found("Hike", hike_id)
            .into_gql()?;
        db.equipment()
            .get_type(equ_type_id)
            .await
            .or_not_found("Equipment type", equ_type_id)
            .into_gql()?;

        let record = db
            .equipment()
            .create_used(hike_id, equ_type_id)
            .await
            .into_gql()?;

        tracing::info!(hike_id, equ_type_id, "Equipment used added");

        Ok(EquipmentUsed::from(record).into())
    }
}

/// The logged-in hiker's most recent hike on a trail
async fn find_latest_hike(ctx: &Context<'_>, trail_id: i64) -> Result<HikeRecord, ApiError> {
    let db = ctx.data_unchecked::<Database>();
    let hiker = hiker_for_request(ctx, None).await?;

    db.hikes()
        .get_latest_for_hiker_on_trail(hiker.id, trail_id)
        .await?
        .ok_or(ApiError::NoHikeOnTrail {
            hiker_id: hiker.id,
            trail_id,
        })
}
