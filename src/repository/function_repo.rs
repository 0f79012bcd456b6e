// ==========================================
// Sistema de Contagens APF - Repositório de Funções
// ==========================================
// Responsabilidade: persistência final das funções de uma contagem
// (tabela funcao). A gravação do finalize substitui o conjunto inteiro
// da contagem em uma única transação.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::function::FunctionRecord;
use crate::domain::types::{Complexity, FunctionType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Transaction};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub struct FunctionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FunctionRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

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
            CREATE TABLE IF NOT EXISTS funcao (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              contagem_id INTEGER NOT NULL REFERENCES contagem(id) ON DELETE CASCADE,
              nome TEXT,
              descricao TEXT,
              tipo_funcao TEXT NOT NULL,
              qtd_der INTEGER NOT NULL DEFAULT 0,
              qtd_rlr INTEGER NOT NULL DEFAULT 0,
              fator_ajuste_id INTEGER REFERENCES fator_ajuste(id),
              complexidade TEXT NOT NULL,
              pf_bruto REAL NOT NULL DEFAULT 0,
              pf_liquido REAL NOT NULL DEFAULT 0,
              data_criacao TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_funcao_contagem
              ON funcao(contagem_id);
            "#,
        )?;
        Ok(())
    }

    fn map_function_row(row: &rusqlite::Row<'_>) -> SqliteResult<FunctionRecord> {
        let type_raw: String = row.get(4)?;
        let complexity_raw: String = row.get(8)?;
        let created_raw: String = row.get(11)?;

        let function_type = FunctionType::from_str(&type_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let complexity = Complexity::from_str(&complexity_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(FunctionRecord {
            id: row.get(0)?,
            count_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            function_type,
            data_element_count: row.get(5)?,
            record_element_count: row.get(6)?,
            adjustment_factor_id: row.get(7)?,
            complexity,
            gross_points: row.get(9)?,
            net_points: row.get(10)?,
            created_at: parse_utc_datetime(&created_raw),
        })
    }

    /// Insere uma função dentro de uma transação já aberta
    fn insert_function_tx(tx: &Transaction, record: &FunctionRecord) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO funcao (
                contagem_id, nome, descricao, tipo_funcao,
                qtd_der, qtd_rlr, fator_ajuste_id,
                complexidade, pf_bruto, pf_liquido, data_criacao
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.count_id,
                record.name,
                record.description,
                record.function_type.to_db_str(),
                record.data_element_count,
                record.record_element_count,
                record.adjustment_factor_id,
                record.complexity.to_db_str(),
                record.gross_points,
                record.net_points,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Substitui todas as funções da contagem pelo conjunto informado,
    /// em transação única. Qualquer falha preserva o conjunto anterior.
    pub fn replace_for_count(
        &self,
        count_id: i64,
        records: &[FunctionRecord],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM funcao WHERE contagem_id = ?1", params![count_id])?;

        let mut count = 0;
        for record in records {
            Self::insert_function_tx(&tx, record)?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// Funções persistidas de uma contagem, na ordem de inserção
    pub fn list_by_count(&self, count_id: i64) -> RepositoryResult<Vec<FunctionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, contagem_id, nome, descricao, tipo_funcao,
                   qtd_der, qtd_rlr, fator_ajuste_id,
                   complexidade, pf_bruto, pf_liquido, data_criacao
            FROM funcao
            WHERE contagem_id = ?1
            ORDER BY id
            "#,
        )?;
        let records = stmt
            .query_map(params![count_id], Self::map_function_row)?
            .collect::<SqliteResult<Vec<FunctionRecord>>>()?;
        Ok(records)
    }
}

/// Datas vêm tanto em RFC 3339 quanto no formato do datetime('now')
fn parse_utc_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::count::NewCount;
    use crate::domain::types::{CountType, CountingMethod};
    use crate::repository::adjustment_factor_repo_impl::AdjustmentFactorRepositoryImpl;
    use crate::repository::count_repo::CountRepository;
    use crate::repository::registry_repo::RegistryRepository;

    fn setup() -> (FunctionRepository, CountRepository) {
        let conn = Arc::new(Mutex::new(
            open_sqlite_connection(":memory:").expect("falha ao abrir banco de teste"),
        ));
        // tabelas referenciadas por chave estrangeira, na ordem de dependência
        RegistryRepository::from_connection(conn.clone()).expect("falha no repo de cadastros");
        AdjustmentFactorRepositoryImpl::from_connection(conn.clone())
            .expect("falha no repo de fatores");
        let counts =
            CountRepository::from_connection(conn.clone()).expect("falha no repo de contagens");
        let functions =
            FunctionRepository::from_connection(conn).expect("falha no repo de funções");
        (functions, counts)
    }

    fn count_fixture(counts: &CountRepository) -> i64 {
        counts
            .create(NewCount {
                description: "Contagem de teste".to_string(),
                count_type: CountType::Desenvolvimento,
                counting_method: CountingMethod::Detalhada,
                client_id: None,
                project_id: None,
                system_id: None,
            })
            .expect("falha ao criar contagem")
            .id
    }

    fn record(count_id: i64, name: &str, net: f64) -> FunctionRecord {
        FunctionRecord {
            id: None,
            count_id,
            name: Some(name.to_string()),
            description: None,
            function_type: FunctionType::Ali,
            data_element_count: 5,
            record_element_count: 1,
            adjustment_factor_id: None,
            complexity: Complexity::Baixa,
            gross_points: 7.0,
            net_points: net,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_replace_and_list() {
        let (functions, counts) = setup();
        let count_id = count_fixture(&counts);

        let inserted = functions
            .replace_for_count(count_id, &[record(count_id, "A", 8.4), record(count_id, "B", 7.0)])
            .expect("falha na gravação");
        assert_eq!(inserted, 2);

        let listed = functions.list_by_count(count_id).expect("falha na leitura");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name.as_deref(), Some("A"));
        assert_eq!(listed[0].complexity, Complexity::Baixa);
        assert_eq!(listed[0].net_points, 8.4);
    }

    #[test]
    fn test_replace_discards_previous_set() {
        let (functions, counts) = setup();
        let count_id = count_fixture(&counts);

        functions
            .replace_for_count(count_id, &[record(count_id, "A", 8.4), record(count_id, "B", 7.0)])
            .unwrap();
        functions
            .replace_for_count(count_id, &[record(count_id, "C", 4.0)])
            .unwrap();

        let listed = functions.list_by_count(count_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name.as_deref(), Some("C"));
    }

    #[test]
    fn test_replace_does_not_touch_other_counts() {
        let (functions, counts) = setup();
        let first = count_fixture(&counts);
        let second = count_fixture(&counts);

        functions
            .replace_for_count(first, &[record(first, "A", 8.4)])
            .unwrap();
        functions
            .replace_for_count(second, &[record(second, "B", 7.0)])
            .unwrap();
        functions.replace_for_count(first, &[]).unwrap();

        assert!(functions.list_by_count(first).unwrap().is_empty());
        assert_eq!(functions.list_by_count(second).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_count_violates_foreign_key() {
        let (functions, _counts) = setup();
        let err = functions
            .replace_for_count(999, &[record(999, "A", 8.4)])
            .unwrap_err();
        assert!(
            matches!(err, RepositoryError::ForeignKeyViolation(_)),
            "{:?}",
            err
        );
    }
}
