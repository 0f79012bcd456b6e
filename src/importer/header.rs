// ==========================================
// Sistema de Contagens APF - Reconstrução de Cabeçalho
// ==========================================
// As planilhas do modelo APF trazem o cabeçalho em duas linhas: a
// superior agrupa seções (células mescladas viram vazios à direita) e
// a inferior traz o rótulo da coluna. Este módulo funde as duas em uma
// única linha de rótulos, garantidamente únicos.
// ==========================================

use crate::domain::staging::CellValue;
use std::collections::HashMap;

// Marcador de coluna sem nome gerado por exportadores de planilha
const UNNAMED_MARKER: &str = "unnamed";

// ==========================================
// HeaderReconstructor
// ==========================================
pub struct HeaderReconstructor;

impl HeaderReconstructor {
    /// Funde as duas linhas de cabeçalho e aplica o passo de unicidade.
    ///
    /// `section_row` é a linha superior (rótulos de seção, propagados à
    /// direita sobre células vazias); `label_row` é a linha inferior.
    /// O resultado tem o comprimento de `label_row`.
    pub fn build(section_row: &[CellValue], label_row: &[CellValue]) -> Vec<String> {
        let merged = Self::merge_rows(section_row, label_row);
        Self::dedupe(merged)
    }

    /// Fusão coluna a coluna com propagação do rótulo de seção.
    ///
    /// Regras, por coluna:
    /// - linha superior não vazia atualiza o rótulo de seção corrente;
    /// - rótulo final = linha inferior, exceto quando vazia ou marcada
    ///   como "unnamed" (caso em que vale o rótulo de seção corrente);
    /// - seção e rótulo inferior presentes e distintos concatenam como
    ///   "{seção} - {rótulo}".
    fn merge_rows(section_row: &[CellValue], label_row: &[CellValue]) -> Vec<String> {
        let mut labels = Vec::with_capacity(label_row.len());
        let mut carried_section = String::new();

        for (col, cell) in label_row.iter().enumerate() {
            if let Some(section) = section_row.get(col).and_then(|c| c.as_text()) {
                carried_section = section;
            }

            let lower = cell.as_text().unwrap_or_default();
            let lower_usable = !lower.is_empty() && !lower.to_lowercase().contains(UNNAMED_MARKER);

            let label = if lower_usable {
                if !carried_section.is_empty() && carried_section != lower {
                    format!("{} - {}", carried_section, lower)
                } else {
                    lower
                }
            } else {
                carried_section.clone()
            };

            labels.push(label);
        }

        labels
    }

    /// Sufixa ocorrências repetidas: a primeira fica como está, as
    /// seguintes recebem `_1`, `_2`, ... Rótulos viram chaves de
    /// mapeamento, então duplicatas não podem sobreviver, nem quando a
    /// planilha já traz rótulos pré-sufixados ("Qtd", "Qtd_1", "Qtd").
    fn dedupe(labels: Vec<String>) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut unique = Vec::with_capacity(labels.len());

        for label in labels {
            match seen.get(&label).copied() {
                None => {
                    seen.insert(label.clone(), 0);
                    unique.push(label);
                }
                Some(occurrences) => {
                    let mut n = occurrences + 1;
                    let mut candidate = format!("{}_{}", label, n);
                    while seen.contains_key(&candidate) {
                        n += 1;
                        candidate = format!("{}_{}", label, n);
                    }
                    seen.insert(label, n);
                    seen.insert(candidate.clone(), 0);
                    unique.push(candidate);
                }
            }
        }

        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn row(values: &[&str]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    CellValue::Empty
                } else {
                    text(v)
                }
            })
            .collect()
    }

    #[test]
    fn test_section_carry_forward_with_concat() {
        let section = row(&["A", "", "B"]);
        let labels = row(&["x", "y", "z"]);
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["A - x", "A - y", "B - z"]
        );
    }

    #[test]
    fn test_empty_lower_row_falls_back_to_section() {
        let section = row(&["Função", "", "Dados"]);
        let labels = row(&["", "", ""]);
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["Função", "Função_1", "Dados"]
        );
    }

    #[test]
    fn test_unnamed_marker_is_ignored() {
        let section = row(&["Seção", ""]);
        let labels = vec![text("Unnamed: 3"), text("unnamed_7")];
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["Seção", "Seção_1"]
        );
    }

    #[test]
    fn test_equal_section_and_label_do_not_concat() {
        let section = row(&["Fator Ajuste"]);
        let labels = row(&["Fator Ajuste"]);
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["Fator Ajuste"]
        );
    }

    #[test]
    fn test_label_without_section() {
        let section = row(&["", ""]);
        let labels = row(&["Tipo Projeto", "Qtd DER"]);
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["Tipo Projeto", "Qtd DER"]
        );
    }

    #[test]
    fn test_uniqueness_suffixing() {
        let labels = vec!["Qtd".to_string(), "Qtd".to_string(), "Qtd".to_string()];
        assert_eq!(
            HeaderReconstructor::dedupe(labels),
            vec!["Qtd", "Qtd_1", "Qtd_2"]
        );
    }

    #[test]
    fn test_uniqueness_with_presuffixed_labels() {
        let labels = vec!["Qtd".to_string(), "Qtd_1".to_string(), "Qtd".to_string()];
        let unique = HeaderReconstructor::dedupe(labels);
        assert_eq!(unique.len(), 3);
        let mut sorted = unique.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3, "rótulos devem ser únicos: {:?}", unique);
    }

    #[test]
    fn test_no_duplicates_after_build() {
        let section = row(&["Dados", "", "", "Transações", ""]);
        let labels = row(&["Qtd", "Qtd", "", "Qtd", ""]);
        let built = HeaderReconstructor::build(&section, &labels);
        let mut sorted = built.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), built.len(), "duplicata em {:?}", built);
    }

    #[test]
    fn test_empty_labels_are_retained() {
        let section = row(&["", ""]);
        let labels = row(&["", "Nome"]);
        let built = HeaderReconstructor::build(&section, &labels);
        assert_eq!(built, vec!["", "Nome"]);
    }

    #[test]
    fn test_shorter_section_row_is_padded() {
        let section = row(&["A"]);
        let labels = row(&["x", "y", "z"]);
        assert_eq!(
            HeaderReconstructor::build(&section, &labels),
            vec!["A - x", "A - y", "A - z"]
        );
    }
}
