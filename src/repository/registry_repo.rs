// ==========================================
// Sistema de Contagens APF - Repositório de Cadastros
// ==========================================
// Responsabilidade: CRUD das tabelas de referência cliente, projeto e
// sistema, apontadas pelas contagens.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::registry::{Client, Project, SystemEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct RegistryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RegistryRepository {
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

    /// Garante a existência das três tabelas de cadastro
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cliente (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              nome TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_cliente_nome ON cliente(nome);

            CREATE TABLE IF NOT EXISTS projeto (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              nome TEXT NOT NULL,
              cliente_id INTEGER REFERENCES cliente(id)
            );
            CREATE INDEX IF NOT EXISTS idx_projeto_cliente ON projeto(cliente_id);

            CREATE TABLE IF NOT EXISTS sistema (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              nome TEXT NOT NULL,
              cliente_id INTEGER REFERENCES cliente(id)
            );
            CREATE INDEX IF NOT EXISTS idx_sistema_cliente ON sistema(cliente_id);
            "#,
        )?;
        Ok(())
    }

    // ===== cliente =====

    pub fn create_client(&self, name: &str) -> RepositoryResult<Client> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO cliente (nome) VALUES (?1)", params![name])?;
        Ok(Client {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn find_client(&self, id: i64) -> RepositoryResult<Option<Client>> {
        let conn = self.get_conn()?;
        let client = conn
            .query_row(
                "SELECT id, nome FROM cliente WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Client {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(client)
    }

    // ===== projeto =====

    pub fn create_project(&self, name: &str, client_id: Option<i64>) -> RepositoryResult<Project> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO projeto (nome, cliente_id) VALUES (?1, ?2)",
            params![name, client_id],
        )?;
        Ok(Project {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            client_id,
        })
    }

    pub fn find_project(&self, id: i64) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let project = conn
            .query_row(
                "SELECT id, nome, cliente_id FROM projeto WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Project {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        client_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(project)
    }

    // ===== sistema =====

    pub fn create_system(
        &self,
        name: &str,
        client_id: Option<i64>,
    ) -> RepositoryResult<SystemEntity> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO sistema (nome, cliente_id) VALUES (?1, ?2)",
            params![name, client_id],
        )?;
        Ok(SystemEntity {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            client_id,
        })
    }

    pub fn find_system(&self, id: i64) -> RepositoryResult<Option<SystemEntity>> {
        let conn = self.get_conn()?;
        let system = conn
            .query_row(
                "SELECT id, nome, cliente_id FROM sistema WHERE id = ?1",
                params![id],
                |row| {
                    Ok(SystemEntity {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        client_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(system)
    }
}
