use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Cascata genérica: apaga as linhas de relação de um agregado inteiro
// ---
// Em vez de reimplementar "DELETE FROM x WHERE dono = $1" em cada call site,
// descrevemos as tabelas de relação uma vez e executamos a cascata na ordem
// declarada (filhas primeiro, raiz por último), sempre dentro da transação
// do chamador.

pub struct RelationTable {
    pub table: &'static str,
    pub owner_column: &'static str,
}

impl RelationTable {
    pub const fn new(table: &'static str, owner_column: &'static str) -> Self {
        Self { table, owner_column }
    }
}

pub(crate) async fn cascade_delete(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
    relations: &[RelationTable],
) -> Result<(), AppError> {
    for relation in relations {
        // `table` e `owner_column` são literais estáticos declarados no código,
        // nunca entrada do usuário, então o format! aqui é seguro.
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            relation.table, relation.owner_column
        );

        sqlx::query(&sql)
            .bind(owner_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
