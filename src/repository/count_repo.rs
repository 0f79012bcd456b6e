// ==========================================
// Sistema de Contagens APF - Repositório de Contagens
// ==========================================
// Responsabilidade: CRUD da tabela contagem.
// O método de contagem é lido aqui e validado na conversão para enum;
// valor desconhecido no banco vira erro de campo, nunca um default.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::count::{Count, NewCount};
use crate::domain::types::{CountType, CountingMethod};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub struct CountRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountRepository {
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
            CREATE TABLE IF NOT EXISTS contagem (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              descricao TEXT NOT NULL,
              tipo_contagem TEXT NOT NULL,
              metodo_contagem TEXT NOT NULL,
              cliente_id INTEGER REFERENCES cliente(id),
              projeto_id INTEGER REFERENCES projeto(id),
              sistema_id INTEGER REFERENCES sistema(id),
              data_criacao TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_contagem_cliente
              ON contagem(cliente_id);
            CREATE INDEX IF NOT EXISTS idx_contagem_data_criacao
              ON contagem(data_criacao DESC);
            "#,
        )?;
        Ok(())
    }

    fn map_count_row(row: &rusqlite::Row<'_>) -> SqliteResult<Count> {
        let count_type_raw: String = row.get(2)?;
        let method_raw: String = row.get(3)?;
        let created_raw: String = row.get(7)?;

        let count_type = CountType::from_str(&count_type_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let counting_method = CountingMethod::from_str(&method_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Count {
            id: row.get(0)?,
            description: row.get(1)?,
            count_type,
            counting_method,
            client_id: row.get(4)?,
            project_id: row.get(5)?,
            system_id: row.get(6)?,
            created_at: parse_utc_datetime(&created_raw),
        })
    }

    pub fn create(&self, count: NewCount) -> RepositoryResult<Count> {
        let conn = self.get_conn()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO contagem (
                descricao, tipo_contagem, metodo_contagem,
                cliente_id, projeto_id, sistema_id, data_criacao
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                count.description,
                count.count_type.to_db_str(),
                count.counting_method.to_db_str(),
                count.client_id,
                count.project_id,
                count.system_id,
                created_at.to_rfc3339(),
            ],
        )?;

        Ok(Count {
            id: conn.last_insert_rowid(),
            description: count.description,
            count_type: count.count_type,
            counting_method: count.counting_method,
            client_id: count.client_id,
            project_id: count.project_id,
            system_id: count.system_id,
            created_at,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Count>> {
        let conn = self.get_conn()?;
        let count = conn
            .query_row(
                r#"
                SELECT id, descricao, tipo_contagem, metodo_contagem,
                       cliente_id, projeto_id, sistema_id, data_criacao
                FROM contagem
                WHERE id = ?1
                "#,
                params![id],
                Self::map_count_row,
            )
            .optional()?;
        Ok(count)
    }

    /// Método de contagem da contagem informada.
    /// Contagem inexistente vira NotFound; método desconhecido no banco
    /// vira erro de campo.
    pub fn get_counting_method(&self, count_id: i64) -> RepositoryResult<CountingMethod> {
        let conn = self.get_conn()?;
        let method_raw: Option<String> = conn
            .query_row(
                "SELECT metodo_contagem FROM contagem WHERE id = ?1",
                params![count_id],
                |row| row.get(0),
            )
            .optional()?;

        let method_raw = method_raw.ok_or_else(|| RepositoryError::NotFound {
            entity: "Contagem".to_string(),
            id: count_id.to_string(),
        })?;

        CountingMethod::from_str(&method_raw).map_err(|e| RepositoryError::FieldValueError {
            field: "metodo_contagem".to_string(),
            message: e.to_string(),
        })
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
    use crate::repository::registry_repo::RegistryRepository;

    fn setup_test_repo() -> CountRepository {
        let conn = Arc::new(Mutex::new(
            open_sqlite_connection(":memory:").expect("falha ao abrir banco de teste"),
        ));
        // tabelas de cadastro referenciadas por chave estrangeira
        RegistryRepository::from_connection(conn.clone()).expect("falha no repo de cadastros");
        CountRepository::from_connection(conn).expect("falha ao criar repositório de teste")
    }

    fn new_count(method: CountingMethod) -> NewCount {
        NewCount {
            description: "Contagem do módulo financeiro".to_string(),
            count_type: CountType::Desenvolvimento,
            counting_method: method,
            client_id: None,
            project_id: None,
            system_id: None,
        }
    }

    #[test]
    fn test_create_and_find() {
        let repo = setup_test_repo();
        let created = repo
            .create(new_count(CountingMethod::Detalhada))
            .expect("falha ao criar");

        let found = repo
            .find_by_id(created.id)
            .expect("falha na busca")
            .expect("contagem não encontrada");

        assert_eq!(found.description, "Contagem do módulo financeiro");
        assert_eq!(found.count_type, CountType::Desenvolvimento);
        assert_eq!(found.counting_method, CountingMethod::Detalhada);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let repo = setup_test_repo();
        assert!(repo.find_by_id(42).expect("falha na busca").is_none());
    }

    #[test]
    fn test_get_counting_method() {
        let repo = setup_test_repo();
        let created = repo.create(new_count(CountingMethod::Estimada)).unwrap();

        let method = repo.get_counting_method(created.id).unwrap();
        assert_eq!(method, CountingMethod::Estimada);
    }

    #[test]
    fn test_get_counting_method_missing_count() {
        let repo = setup_test_repo();
        let err = repo.get_counting_method(99).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }), "{:?}", err);
    }

    #[test]
    fn test_get_counting_method_with_corrupt_value() {
        let repo = setup_test_repo();
        let created = repo.create(new_count(CountingMethod::Detalhada)).unwrap();

        {
            let conn = repo.conn.lock().unwrap();
            conn.execute(
                "UPDATE contagem SET metodo_contagem = 'Inexistente' WHERE id = ?1",
                params![created.id],
            )
            .unwrap();
        }

        let err = repo.get_counting_method(created.id).unwrap_err();
        assert!(
            matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "metodo_contagem"),
            "{:?}",
            err
        );
    }
}
