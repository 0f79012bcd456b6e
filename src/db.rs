// ==========================================
// Sistema de Contagens APF - Inicialização do SQLite
// ==========================================
// Objetivo:
// - unificar os PRAGMAs de todo Connection::open, evitando módulos com
//   chave estrangeira ligada e outros sem
// - unificar o busy_timeout para reduzir erros "busy" em escrita
//   concorrente
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// busy_timeout padrão (milissegundos)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Aplica os PRAGMAs unificados à conexão
///
/// Observação:
/// - foreign_keys precisa ser ligado por conexão
/// - busy_timeout precisa ser configurado por conexão
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Abre a conexão SQLite já com a configuração unificada
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}
