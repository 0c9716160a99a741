use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::ChamadosError;

/// Status de um chamado. Os literais serializados fazem parte do contrato
/// com o front-end, que casa nas strings exatas para filtros e estilo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusChamado {
    #[serde(rename = "Aberto")]
    Aberto,
    #[serde(rename = "Em análise")]
    EmAnalise,
    #[serde(rename = "Pendente")]
    Pendente,
    #[serde(rename = "Resolvido")]
    Resolvido,
    #[serde(rename = "Fechado")]
    Fechado,
}

impl StatusChamado {
    pub const TODOS: [StatusChamado; 5] = [
        StatusChamado::Aberto,
        StatusChamado::EmAnalise,
        StatusChamado::Pendente,
        StatusChamado::Resolvido,
        StatusChamado::Fechado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusChamado::Aberto => "Aberto",
            StatusChamado::EmAnalise => "Em análise",
            StatusChamado::Pendente => "Pendente",
            StatusChamado::Resolvido => "Resolvido",
            StatusChamado::Fechado => "Fechado",
        }
    }

    pub fn from_wire(valor: &str) -> Option<Self> {
        Self::TODOS.iter().copied().find(|s| s.as_str() == valor)
    }

    /// Chamado ainda em aberto do ponto de vista operacional (conta para
    /// críticos abertos e vencidos no dashboard).
    pub fn em_aberto(&self) -> bool {
        matches!(
            self,
            StatusChamado::Aberto | StatusChamado::EmAnalise | StatusChamado::Pendente
        )
    }

    pub fn finalizado(&self) -> bool {
        matches!(self, StatusChamado::Resolvido | StatusChamado::Fechado)
    }
}

impl Default for StatusChamado {
    fn default() -> Self {
        StatusChamado::Aberto
    }
}

impl std::fmt::Display for StatusChamado {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriticidadeChamado {
    #[serde(rename = "Baixa")]
    Baixa,
    #[serde(rename = "Média")]
    Media,
    #[serde(rename = "Alta")]
    Alta,
    #[serde(rename = "Crítica")]
    Critica,
}

impl CriticidadeChamado {
    pub const TODAS: [CriticidadeChamado; 4] = [
        CriticidadeChamado::Baixa,
        CriticidadeChamado::Media,
        CriticidadeChamado::Alta,
        CriticidadeChamado::Critica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriticidadeChamado::Baixa => "Baixa",
            CriticidadeChamado::Media => "Média",
            CriticidadeChamado::Alta => "Alta",
            CriticidadeChamado::Critica => "Crítica",
        }
    }

    pub fn from_wire(valor: &str) -> Option<Self> {
        Self::TODAS.iter().copied().find(|c| c.as_str() == valor)
    }
}

impl Default for CriticidadeChamado {
    fn default() -> Self {
        CriticidadeChamado::Media
    }
}

impl std::fmt::Display for CriticidadeChamado {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoFollowUp {
    #[serde(rename = "Publicação")]
    Publicacao,
    #[serde(rename = "Desenvolvimento")]
    Desenvolvimento,
    #[serde(rename = "Análise")]
    Analise,
    #[serde(rename = "Outros")]
    Outros,
}

impl TipoFollowUp {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoFollowUp::Publicacao => "Publicação",
            TipoFollowUp::Desenvolvimento => "Desenvolvimento",
            TipoFollowUp::Analise => "Análise",
            TipoFollowUp::Outros => "Outros",
        }
    }
}

impl Default for TipoFollowUp {
    fn default() -> Self {
        TipoFollowUp::Outros
    }
}

impl std::fmt::Display for TipoFollowUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro interno de um chamado. `total_followups` nunca é armazenado:
/// o valor exposto na resposta é sempre derivado da lista de follow-ups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chamado {
    pub id: i64,
    pub numero_wex: String,
    pub cliente_solicitante: String,
    pub descricao: String,
    pub status: StatusChamado,
    pub criticidade: CriticidadeChamado,
    pub data_criacao: NaiveDateTime,
    pub data_atualizacao: NaiveDateTime,
    pub sla_limite: Option<NaiveDateTime>,
    pub tags_automaticas: Vec<String>,
    pub score_qualidade: i32,
    pub ambiente_informado: bool,
    pub possui_anexos: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: i64,
    pub chamado_id: i64,
    pub tipo: TipoFollowUp,
    pub descricao: String,
    pub data_criacao: NaiveDateTime,
    pub autor: String,
    pub anexos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChamadoResponse {
    #[serde(flatten)]
    pub chamado: Chamado,
    pub total_followups: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChamadoCreate {
    pub numero_wex: String,
    pub cliente_solicitante: String,
    pub descricao: String,
    #[serde(default)]
    pub status: StatusChamado,
    #[serde(default)]
    pub criticidade: CriticidadeChamado,
    #[serde(default)]
    pub sla_limite: Option<NaiveDateTime>,
    #[serde(default)]
    pub tags_automaticas: Vec<String>,
    #[serde(default)]
    pub score_qualidade: i32,
    #[serde(default)]
    pub ambiente_informado: bool,
    #[serde(default)]
    pub possui_anexos: bool,
}

/// Patch parcial: campos ausentes ficam como estão. As transições de status
/// são dirigidas pelo chamador; o servidor não impõe máquina de estados.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChamadoUpdate {
    pub numero_wex: Option<String>,
    pub cliente_solicitante: Option<String>,
    pub descricao: Option<String>,
    pub status: Option<StatusChamado>,
    pub criticidade: Option<CriticidadeChamado>,
    pub sla_limite: Option<NaiveDateTime>,
    pub tags_automaticas: Option<Vec<String>>,
    pub score_qualidade: Option<i32>,
    pub ambiente_informado: Option<bool>,
    pub possui_anexos: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowUpCreate {
    #[serde(default)]
    pub tipo: TipoFollowUp,
    pub descricao: String,
    pub autor: String,
    #[serde(default)]
    pub anexos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChamadoListResponse {
    pub chamados: Vec<ChamadoResponse>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub pages: usize,
}

/// Filtros da listagem. O front-end envia `status`/`criticidade` como chaves
/// repetidas na query string, então o parse parte dos pares crus.
#[derive(Debug, Clone)]
pub struct ChamadoFiltros {
    pub status: Vec<StatusChamado>,
    pub criticidade: Vec<CriticidadeChamado>,
    pub cliente: Option<String>,
    pub busca_texto: Option<String>,
    pub data_inicio: Option<NaiveDateTime>,
    pub data_fim: Option<NaiveDateTime>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for ChamadoFiltros {
    fn default() -> Self {
        Self {
            status: Vec::new(),
            criticidade: Vec::new(),
            cliente: None,
            busca_texto: None,
            data_inicio: None,
            data_fim: None,
            skip: 0,
            limit: 20,
        }
    }
}

impl ChamadoFiltros {
    pub fn from_pairs(pares: &[(String, String)]) -> Result<Self, ChamadosError> {
        let mut filtros = Self::default();
        let mut limit: usize = 20;

        for (chave, valor) in pares {
            match chave.as_str() {
                "status" => {
                    let status = StatusChamado::from_wire(valor).ok_or_else(|| {
                        ChamadosError::Validation(format!("status inválido: {valor}"))
                    })?;
                    filtros.status.push(status);
                }
                "criticidade" => {
                    let criticidade = CriticidadeChamado::from_wire(valor).ok_or_else(|| {
                        ChamadosError::Validation(format!("criticidade inválida: {valor}"))
                    })?;
                    filtros.criticidade.push(criticidade);
                }
                "cliente" => filtros.cliente = Some(valor.clone()),
                "busca_texto" => filtros.busca_texto = Some(valor.clone()),
                "data_inicio" => {
                    filtros.data_inicio = Some(valor.parse().map_err(|_| {
                        ChamadosError::Validation(format!("data_inicio inválida: {valor}"))
                    })?);
                }
                "data_fim" => {
                    filtros.data_fim = Some(valor.parse().map_err(|_| {
                        ChamadosError::Validation(format!("data_fim inválida: {valor}"))
                    })?);
                }
                "skip" => {
                    filtros.skip = valor.parse().map_err(|_| {
                        ChamadosError::Validation(format!("skip inválido: {valor}"))
                    })?;
                }
                "limit" => {
                    limit = valor.parse().map_err(|_| {
                        ChamadosError::Validation(format!("limit inválido: {valor}"))
                    })?;
                }
                _ => {}
            }
        }

        filtros.limit = limit.clamp(1, 100);
        Ok(filtros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn par(chave: &str, valor: &str) -> (String, String) {
        (chave.to_string(), valor.to_string())
    }

    #[test]
    fn test_status_wire_literals() {
        assert_eq!(
            serde_json::to_string(&StatusChamado::EmAnalise).unwrap(),
            "\"Em análise\""
        );
        assert_eq!(
            serde_json::from_str::<StatusChamado>("\"Aberto\"").unwrap(),
            StatusChamado::Aberto
        );
        assert_eq!(
            serde_json::to_string(&CriticidadeChamado::Critica).unwrap(),
            "\"Crítica\""
        );
        assert_eq!(
            serde_json::to_string(&TipoFollowUp::Publicacao).unwrap(),
            "\"Publicação\""
        );
    }

    #[test]
    fn test_status_from_wire_rejects_unknown() {
        assert!(StatusChamado::from_wire("Em análise").is_some());
        assert!(StatusChamado::from_wire("aberto").is_none());
        assert!(CriticidadeChamado::from_wire("Urgente").is_none());
    }

    #[test]
    fn test_filtros_from_pairs_repeated_keys() {
        let pares = vec![
            par("status", "Aberto"),
            par("status", "Pendente"),
            par("criticidade", "Crítica"),
            par("cliente", "ABC"),
            par("skip", "40"),
            par("limit", "20"),
        ];
        let filtros = ChamadoFiltros::from_pairs(&pares).unwrap();
        assert_eq!(
            filtros.status,
            vec![StatusChamado::Aberto, StatusChamado::Pendente]
        );
        assert_eq!(filtros.criticidade, vec![CriticidadeChamado::Critica]);
        assert_eq!(filtros.cliente.as_deref(), Some("ABC"));
        assert_eq!(filtros.skip, 40);
        assert_eq!(filtros.limit, 20);
    }

    #[test]
    fn test_filtros_limit_clamped() {
        let filtros =
            ChamadoFiltros::from_pairs(&[par("limit", "500")]).unwrap();
        assert_eq!(filtros.limit, 100);
        let filtros = ChamadoFiltros::from_pairs(&[par("limit", "0")]).unwrap();
        assert_eq!(filtros.limit, 1);
    }

    #[test]
    fn test_filtros_unknown_literal_is_validation_error() {
        let err = ChamadoFiltros::from_pairs(&[par("status", "Qualquer")]).unwrap_err();
        assert!(matches!(err, ChamadosError::Validation(_)));
    }

    #[test]
    fn test_filtros_date_range_parse() {
        let filtros = ChamadoFiltros::from_pairs(&[
            par("data_inicio", "2025-10-01T00:00:00"),
            par("data_fim", "2025-10-31T23:59:59"),
        ])
        .unwrap();
        assert!(filtros.data_inicio.unwrap() < filtros.data_fim.unwrap());
    }

    #[test]
    fn test_chamado_create_defaults() {
        let req: ChamadoCreate = serde_json::from_str(
            r#"{"numero_wex":"WEX-001","cliente_solicitante":"ABC","descricao":"Erro"}"#,
        )
        .unwrap();
        assert_eq!(req.status, StatusChamado::Aberto);
        assert_eq!(req.criticidade, CriticidadeChamado::Media);
        assert_eq!(req.score_qualidade, 0);
        assert!(req.tags_automaticas.is_empty());
    }
}
