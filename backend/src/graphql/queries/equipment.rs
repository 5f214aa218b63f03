use super::prelude::*;

#[derive(Default)]
pub struct EquipmentQueries;

#[Object]
impl EquipmentQueries {
    /// Every equipment type
    async fn all_equ_types(&self, ctx: &Context<'_>) -> Result<Vec<EquipmentType>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.equipment().list_types().await.into_gql()?;
        Ok(records.into_iter().map(EquipmentType::from).collect())
    }
}
