use super::prelude::*;

#[derive(Default)]
pub struct EquipmentMutations;

#[Object]
impl EquipmentMutations {
    /// Add an equipment type to the catalogue
    async fn create_equipment_type(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "equType")] equ_type: String,
    ) -> Result<CreateEquipmentTypePayload> {
        let db = ctx.data_unchecked::<Database>();
        let record = db.equipment().create_type(&equ_type).await.into_gql()?;

        tracing::info!(
            equipment_type_id = record.id,
            equ_type = %record.equ_type,
            "Equipment type created"
        );

        Ok(EquipmentType::from(record).into())
    }
}
