// ==========================================
// Sistema de Contagens APF - Repositório de Fatores (rusqlite)
// ==========================================
// Responsabilidade: CRUD da tabela fator_ajuste.
// Lote de criação é transacionado: falha no meio desfaz tudo.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::adjustment::{AdjustmentFactor, AdjustmentFactorUpdate, NewAdjustmentFactor};
use crate::domain::types::AdjustmentKind;
use crate::repository::adjustment_factor_repo::AdjustmentFactorRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Transaction};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// AdjustmentFactorRepositoryImpl
// ==========================================
pub struct AdjustmentFactorRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl AdjustmentFactorRepositoryImpl {
    /// Cria o repositório abrindo o banco no caminho informado
    ///
    /// # Parâmetros
    /// - db_path: caminho do arquivo de banco
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    /// Cria o repositório sobre uma conexão compartilhada
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Garante a existência da tabela
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS fator_ajuste (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              nome TEXT NOT NULL UNIQUE,
              fator REAL NOT NULL,
              tipo_ajuste TEXT NOT NULL DEFAULT 'PERCENTUAL'
            );

            CREATE INDEX IF NOT EXISTS idx_fator_ajuste_nome
              ON fator_ajuste(nome);
            "#,
        )?;
        Ok(())
    }

    fn map_factor_row(row: &rusqlite::Row<'_>) -> SqliteResult<AdjustmentFactor> {
        let kind_raw: String = row.get(3)?;
        let kind = AdjustmentKind::from_str(&kind_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(AdjustmentFactor {
            id: row.get(0)?,
            name: row.get(1)?,
            multiplier: row.get(2)?,
            kind,
        })
    }

    /// Insere um fator dentro de uma transação já aberta
    fn insert_factor_tx(tx: &Transaction, factor: &NewAdjustmentFactor) -> RepositoryResult<i64> {
        tx.execute(
            "INSERT INTO fator_ajuste (nome, fator, tipo_ajuste) VALUES (?1, ?2, ?3)",
            params![factor.name, factor.multiplier, factor.kind.to_db_str()],
        )?;
        Ok(tx.last_insert_rowid())
    }
}

#[async_trait]
impl AdjustmentFactorRepository for AdjustmentFactorRepositoryImpl {
    async fn list_all(&self) -> RepositoryResult<Vec<AdjustmentFactor>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, nome, fator, tipo_ajuste FROM fator_ajuste ORDER BY nome",
        )?;
        let factors = stmt
            .query_map([], Self::map_factor_row)?
            .collect::<SqliteResult<Vec<AdjustmentFactor>>>()?;
        Ok(factors)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<AdjustmentFactor>> {
        let conn = self.get_conn()?;
        let factor = conn
            .query_row(
                "SELECT id, nome, fator, tipo_ajuste FROM fator_ajuste WHERE id = ?1",
                params![id],
                Self::map_factor_row,
            )
            .optional()?;
        Ok(factor)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<AdjustmentFactor>> {
        let conn = self.get_conn()?;
        let factor = conn
            .query_row(
                "SELECT id, nome, fator, tipo_ajuste FROM fator_ajuste WHERE nome = ?1",
                params![name],
                Self::map_factor_row,
            )
            .optional()?;
        Ok(factor)
    }

    async fn create(&self, factor: NewAdjustmentFactor) -> RepositoryResult<AdjustmentFactor> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO fator_ajuste (nome, fator, tipo_ajuste) VALUES (?1, ?2, ?3)",
            params![factor.name, factor.multiplier, factor.kind.to_db_str()],
        )?;
        Ok(AdjustmentFactor {
            id: conn.last_insert_rowid(),
            name: factor.name,
            multiplier: factor.multiplier,
            kind: factor.kind,
        })
    }

    /// Lote transacionado (tudo ou nada)
    async fn create_batch(&self, factors: Vec<NewAdjustmentFactor>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for factor in &factors {
            Self::insert_factor_tx(&tx, factor)?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        changes: AdjustmentFactorUpdate,
    ) -> RepositoryResult<AdjustmentFactor> {
        let conn = self.get_conn()?;

        let current = conn
            .query_row(
                "SELECT id, nome, fator, tipo_ajuste FROM fator_ajuste WHERE id = ?1",
                params![id],
                Self::map_factor_row,
            )
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "FatorAjuste".to_string(),
                id: id.to_string(),
            })?;

        if changes.is_empty() {
            return Ok(current);
        }

        let updated = AdjustmentFactor {
            id: current.id,
            name: changes.name.unwrap_or(current.name),
            multiplier: changes.multiplier.unwrap_or(current.multiplier),
            kind: changes.kind.unwrap_or(current.kind),
        };

        conn.execute(
            "UPDATE fator_ajuste SET nome = ?1, fator = ?2, tipo_ajuste = ?3 WHERE id = ?4",
            params![
                updated.name,
                updated.multiplier,
                updated.kind.to_db_str(),
                updated.id
            ],
        )?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM fator_ajuste WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "FatorAjuste".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
