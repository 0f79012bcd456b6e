// ==========================================
// Sistema de Contagens APF - Gerenciador de Configuração
// ==========================================
// Responsabilidade: leitura e escrita de parâmetros operacionais
// Armazenamento: tabela config_kv (chave-valor + escopo)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - Gerenciador de configuração
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Cria uma nova instância de ConfigManager
    ///
    /// # Parâmetros
    /// - db_path: caminho do arquivo de banco de dados
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// Cria um ConfigManager a partir de uma conexão existente
    ///
    /// Observação: para manter o comportamento uniforme entre conexões, os
    /// PRAGMAs padrão são reaplicados na conexão recebida (idempotente).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("Falha ao adquirir lock: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// Garante a existência da tabela config_kv
    fn ensure_table(&self) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("Falha ao adquirir lock: {}", e))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL DEFAULT 'global',
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (scope_id, key)
            );",
        )?;

        Ok(())
    }

    /// Lê um valor de configuração da tabela config_kv (scope_id='global')
    ///
    /// # Parâmetros
    /// - key: chave de configuração
    ///
    /// # Retorno
    /// - Some(String): valor configurado
    /// - None: configuração ausente
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("Falha ao adquirir lock: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Lê um valor de configuração do escopo global (método público, para reuso)
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// Lê um valor de configuração com fallback para o padrão informado
    ///
    /// # Parâmetros
    /// - key: chave de configuração
    /// - default: valor padrão
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Grava (ou sobrescreve) um valor de configuração no escopo global
    ///
    /// # Parâmetros
    /// - key: chave de configuração
    /// - value: valor a persistir
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("Falha ao adquirir lock: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;

        Ok(())
    }

    // ===== Sessões de staging =====

    /// Tempo de vida de uma sessão de importação em staging, em minutos
    ///
    /// Sessões sem atividade além desse limite são elegíveis para descarte
    /// pela varredura periódica.
    pub fn get_session_ttl_minutes(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SESSION_TTL_MINUTES, "120")?;
        Ok(value.parse::<i64>().unwrap_or(120))
    }

    // ===== Prévias de importação =====

    /// Quantidade de linhas retornadas na prévia logo após o upload
    pub fn get_import_preview_rows(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::IMPORT_PREVIEW_ROWS, "5")?;
        Ok(value.parse::<usize>().unwrap_or(5))
    }

    /// Quantidade de linhas retornadas na prévia após a pontuação
    pub fn get_scored_preview_rows(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SCORED_PREVIEW_ROWS, "10")?;
        Ok(value.parse::<usize>().unwrap_or(10))
    }
}

// ==========================================
// Chaves de configuração
// ==========================================
pub mod config_keys {
    // Sessões de staging
    pub const SESSION_TTL_MINUTES: &str = "staging/session_ttl_minutes";

    // Prévias de importação
    pub const IMPORT_PREVIEW_ROWS: &str = "import/preview_rows";
    pub const SCORED_PREVIEW_ROWS: &str = "import/scored_preview_rows";
}
