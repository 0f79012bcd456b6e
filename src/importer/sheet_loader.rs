// ==========================================
// Sistema de Contagens APF - Leitor de Planilha
// ==========================================
// Lê os bytes do arquivo enviado, seleciona a guia pelo método de
// contagem e produz as linhas brutas (RawRow) já com cabeçalho
// reconstruído, largura ajustada e colunas/linhas vazias removidas.
// Contrato estrutural da guia: cabeçalho nas linhas físicas 8 e 9,
// dados a partir da linha 10.
// ==========================================

use crate::domain::staging::{CellValue, RawRow};
use crate::domain::types::CountingMethod;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header::HeaderReconstructor;
use calamine::{Data, Range, Reader, Xlsx};
use indexmap::IndexMap;
use std::io::Cursor;

// ===== contrato estrutural da guia (linhas físicas, 1-based) =====
pub const SECTION_HEADER_ROW: usize = 8;
pub const LABEL_HEADER_ROW: usize = 9;
pub const FIRST_DATA_ROW: usize = 10;

// ===== guias reconhecidas =====
pub const SHEET_DETALHADA: &str = "AFP - Detalhada";
pub const SHEET_ESTIMATIVA: &str = "AFP - Estimativa";

/// Guia correspondente ao método de contagem
pub fn sheet_name_for(method: CountingMethod) -> &'static str {
    match method {
        CountingMethod::Detalhada => SHEET_DETALHADA,
        CountingMethod::Estimada => SHEET_ESTIMATIVA,
    }
}

// ==========================================
// LoadedSheet - resultado da leitura
// ==========================================
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub original_filename: String,
    pub headers: Vec<String>, // rótulos das colunas retidas
    pub rows: Vec<RawRow>,
}

// ==========================================
// SheetLoader
// ==========================================
pub struct SheetLoader;

impl SheetLoader {
    /// Abre a pasta de trabalho a partir dos bytes enviados e extrai a
    /// guia do método informado. Qualquer falha aborta sem estado
    /// parcial.
    pub fn load(
        original_filename: &str,
        bytes: &[u8],
        method: CountingMethod,
    ) -> ImportResult<LoadedSheet> {
        let sheet_name = sheet_name_for(method);

        let cursor = Cursor::new(bytes.to_vec());
        let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;

        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(ImportError::SheetNotFound(sheet_name.to_string()));
        }

        let range = workbook.worksheet_range(sheet_name)?;

        tracing::info!(
            "lendo guia '{}' de '{}' ({} células usadas)",
            sheet_name,
            original_filename,
            range.used_cells().count()
        );

        Self::from_range(original_filename, sheet_name, &range)
    }

    /// Extrai cabeçalho e dados de uma região de células já carregada.
    /// Separado de `load` para permitir montar guias em memória.
    pub fn from_range(
        original_filename: &str,
        sheet_name: &str,
        range: &Range<Data>,
    ) -> ImportResult<LoadedSheet> {
        let (end_row, end_col) = range
            .end()
            .ok_or_else(|| ImportError::EmptySheet(sheet_name.to_string()))?;
        let end_row = end_row as usize;
        let total_width = end_col as usize + 1;

        // ===== cabeçalho: linhas físicas 8 e 9 =====
        let section_row: Vec<CellValue> = (0..total_width)
            .map(|c| Self::cell_at(range, SECTION_HEADER_ROW - 1, c))
            .collect();
        let label_row: Vec<CellValue> = (0..total_width)
            .map(|c| Self::cell_at(range, LABEL_HEADER_ROW - 1, c))
            .collect();
        let headers = HeaderReconstructor::build(&section_row, &label_row);

        // ===== largura efetiva dos dados =====
        // O cabeçalho pode ser mais largo que os dados (ou o inverso);
        // vale a interseção.
        let mut data_width = 0usize;
        if end_row >= FIRST_DATA_ROW - 1 {
            for abs_row in (FIRST_DATA_ROW - 1)..=end_row {
                for col in (data_width..total_width).rev() {
                    if !Self::cell_at(range, abs_row, col).is_empty() {
                        data_width = data_width.max(col + 1);
                        break;
                    }
                }
            }
        }
        let num_cols = headers.len().min(data_width);
        let mut headers: Vec<String> = headers.into_iter().take(num_cols).collect();

        // ===== grade de dados =====
        let mut grid: Vec<(usize, Vec<CellValue>)> = Vec::new();
        if end_row >= FIRST_DATA_ROW - 1 && num_cols > 0 {
            for abs_row in (FIRST_DATA_ROW - 1)..=end_row {
                let cells: Vec<CellValue> = (0..num_cols)
                    .map(|c| Self::cell_at(range, abs_row, c))
                    .collect();
                grid.push((abs_row + 1, cells));
            }
        }

        // ===== remove colunas totalmente vazias =====
        if !grid.is_empty() {
            let keep: Vec<bool> = (0..num_cols)
                .map(|col| grid.iter().any(|(_, cells)| !cells[col].is_empty()))
                .collect();

            if keep.iter().any(|k| !k) {
                tracing::debug!(
                    "descartando {} coluna(s) vazia(s) da guia '{}'",
                    keep.iter().filter(|k| !**k).count(),
                    sheet_name
                );
                headers = headers
                    .into_iter()
                    .zip(keep.iter())
                    .filter_map(|(h, k)| k.then_some(h))
                    .collect();
                for (_, cells) in grid.iter_mut() {
                    let filtered: Vec<CellValue> = cells
                        .drain(..)
                        .zip(keep.iter())
                        .filter_map(|(c, k)| k.then_some(c))
                        .collect();
                    *cells = filtered;
                }
            }
        }

        // ===== remove linhas totalmente vazias =====
        let rows: Vec<RawRow> = grid
            .into_iter()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(|(row_number, cells)| {
                let map: IndexMap<String, CellValue> =
                    headers.iter().cloned().zip(cells).collect();
                RawRow::new(row_number, map)
            })
            .collect();

        tracing::info!(
            "guia '{}': {} linha(s) de dados, {} coluna(s) retida(s)",
            sheet_name,
            rows.len(),
            headers.len()
        );

        Ok(LoadedSheet {
            original_filename: original_filename.to_string(),
            headers,
            rows,
        })
    }

    fn cell_at(range: &Range<Data>, row: usize, col: usize) -> CellValue {
        range
            .get_value((row as u32, col as u32))
            .map(Self::normalize_cell)
            .unwrap_or(CellValue::Empty)
    }

    /// Normaliza a célula do calamine para o modelo do domínio.
    /// Célula ausente, em branco ou com erro de fórmula vira Empty.
    fn normalize_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }
}
