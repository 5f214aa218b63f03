use super::prelude::*;

#[derive(Default)]
pub struct TrailMutations;

#[Object]
impl TrailMutations {
    /// Add a trail
    #[allow(clippy::too_many_arguments)]
    async fn create_trail(
        &self,
        ctx: &Context<'_>,
        name: String,
        prop: String,
        city: String,
        state: String,
        description: String,
        is_open: bool,
        altitude_change: i64,
        distance: i64,
        fee: f64,
        image: Option<String>,
    ) -> Result<CreateTrailPayload> {
        let db = ctx.data_unchecked::<Database>();

        let record = db
            .trails()
            .create(CreateTrail {
                name,
                prop,
                city,
                state,
                description,
                is_open,
                altitude_change,
                distance,
                fee,
                image,
            })
            .await
            .into_gql()?;

        tracing::info!(trail_id = record.id, name = %record.name, "Trail created");

        Ok(Trail::from(record).into())
    }

    /// Attach a tag to a trail
    async fn create_tag(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
        tag: String,
    ) -> Result<CreateTagPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.trails()
            .get_by_id(trail_id)
            .await
            .or_not_found("Trail", trail_id)
            .into_gql()?;

        let record = db.tags().create(trail_id, &tag).await.into_gql()?;

        tracing::info!(trail_id, tag = %record.tag, "Tag created");

        Ok(Tag::from(record).into())
    }

    /// Recommend an equipment type for a trail
    async fn create_suggested_equipment(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "trailID")] trail_id: i64,
        #[graphql(name = "equTypeID")] equ_type_id: i64,
    ) -> Result<CreateSuggestedEquipmentPayload> {
        let db = ctx.data_unchecked::<Database>();
        db.trails()
            .get_by_id(trail_id)
            .await
            .or_not_found("Trail", trail_id)
            .into_gql()?;
        db.equipment()
            .get_type(equ_type_id)
            .await
            .or_not_found("Equipment type", equ_type_id)
            .into_gql()?;

        let record = db
            .equipment()
            .create_suggested(trail_id, equ_type_id)
            .await
            .into_gql()?;

        tracing::info!(trail_id, equ_type_id, "Suggested equipment created");

        Ok(SuggestedEquipment::from(record).into())
    }
}
