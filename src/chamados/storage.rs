//! Armazenamento em memória de chamados e follow-ups.
//!
//! Um único `RwLock` guarda os dois mapas: qualquer leitor observa um
//! snapshot consistente e a inserção de um follow-up nunca é visível sem o
//! reflexo no contador derivado do chamado dono.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::error::ChamadosError;
use super::types::{
    Chamado, ChamadoCreate, ChamadoFiltros, ChamadoListResponse, ChamadoResponse, ChamadoUpdate,
    CriticidadeChamado, FollowUp, FollowUpCreate,
};

#[derive(Default)]
struct StoreInner {
    chamados: BTreeMap<i64, Chamado>,
    followups: BTreeMap<i64, Vec<FollowUp>>,
    proximo_chamado_id: i64,
    proximo_followup_id: i64,
}

impl StoreInner {
    fn total_followups(&self, chamado_id: i64) -> usize {
        self.followups.get(&chamado_id).map_or(0, |lista| lista.len())
    }

    fn response(&self, chamado: &Chamado) -> ChamadoResponse {
        ChamadoResponse {
            chamado: chamado.clone(),
            total_followups: self.total_followups(chamado.id),
        }
    }

    fn numero_wex_em_uso(&self, numero: &str, exceto: Option<i64>) -> bool {
        self.chamados
            .values()
            .any(|c| c.numero_wex == numero && Some(c.id) != exceto)
    }
}

pub struct ChamadoStore {
    inner: RwLock<StoreInner>,
}

impl Default for ChamadoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChamadoStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub async fn criar_chamado(
        &self,
        req: ChamadoCreate,
        agora: NaiveDateTime,
    ) -> Result<ChamadoResponse, ChamadosError> {
        validar_score(req.score_qualidade)?;

        let mut inner = self.inner.write().await;
        if inner.numero_wex_em_uso(&req.numero_wex, None) {
            return Err(ChamadosError::Validation("Número WEX já existe".to_string()));
        }

        inner.proximo_chamado_id += 1;
        let id = inner.proximo_chamado_id;

        let chamado = Chamado {
            id,
            numero_wex: req.numero_wex,
            cliente_solicitante: req.cliente_solicitante,
            descricao: req.descricao,
            status: req.status,
            criticidade: req.criticidade,
            data_criacao: agora,
            data_atualizacao: agora,
            sla_limite: req.sla_limite,
            tags_automaticas: req.tags_automaticas,
            score_qualidade: req.score_qualidade,
            ambiente_informado: req.ambiente_informado,
            possui_anexos: req.possui_anexos,
        };

        let response = inner.response(&chamado);
        inner.chamados.insert(id, chamado);
        Ok(response)
    }

    pub async fn obter_chamado(&self, id: i64) -> Result<ChamadoResponse, ChamadosError> {
        let inner = self.inner.read().await;
        let chamado = inner
            .chamados
            .get(&id)
            .ok_or_else(|| ChamadosError::chamado_nao_encontrado(id))?;
        Ok(inner.response(chamado))
    }

    pub async fn atualizar_chamado(
        &self,
        id: i64,
        patch: ChamadoUpdate,
        agora: NaiveDateTime,
    ) -> Result<ChamadoResponse, ChamadosError> {
        if let Some(score) = patch.score_qualidade {
            validar_score(score)?;
        }

        let mut inner = self.inner.write().await;
        if let Some(numero) = &patch.numero_wex {
            if inner.numero_wex_em_uso(numero, Some(id)) {
                return Err(ChamadosError::Validation("Número WEX já existe".to_string()));
            }
        }

        let chamado = inner
            .chamados
            .get_mut(&id)
            .ok_or_else(|| ChamadosError::chamado_nao_encontrado(id))?;

        if let Some(numero) = patch.numero_wex {
            chamado.numero_wex = numero;
        }
        if let Some(cliente) = patch.cliente_solicitante {
            chamado.cliente_solicitante = cliente;
        }
        if let Some(descricao) = patch.descricao {
            chamado.descricao = descricao;
        }
        if let Some(status) = patch.status {
            chamado.status = status;
        }
        if let Some(criticidade) = patch.criticidade {
            chamado.criticidade = criticidade;
        }
        if let Some(sla) = patch.sla_limite {
            chamado.sla_limite = Some(sla);
        }
        if let Some(tags) = patch.tags_automaticas {
            chamado.tags_automaticas = tags;
        }
        if let Some(score) = patch.score_qualidade {
            chamado.score_qualidade = score;
        }
        if let Some(ambiente) = patch.ambiente_informado {
            chamado.ambiente_informado = ambiente;
        }
        if let Some(anexos) = patch.possui_anexos {
            chamado.possui_anexos = anexos;
        }
        chamado.data_atualizacao = agora;

        let chamado = chamado.clone();
        Ok(inner.response(&chamado))
    }

    /// Persiste o resultado de uma triagem sobre o chamado.
    pub async fn aplicar_triagem(
        &self,
        id: i64,
        criticidade: CriticidadeChamado,
        score_qualidade: i32,
        tags_automaticas: Vec<String>,
        agora: NaiveDateTime,
    ) -> Result<ChamadoResponse, ChamadosError> {
        validar_score(score_qualidade)?;
        let mut inner = self.inner.write().await;
        let chamado = inner
            .chamados
            .get_mut(&id)
            .ok_or_else(|| ChamadosError::chamado_nao_encontrado(id))?;
        chamado.criticidade = criticidade;
        chamado.score_qualidade = score_qualidade;
        chamado.tags_automaticas = tags_automaticas;
        chamado.data_atualizacao = agora;
        let chamado = chamado.clone();
        Ok(inner.response(&chamado))
    }

    /// Lista com filtros AND entre dimensões e paginação via skip/limit.
    /// Ordenação: `data_criacao` decrescente, id decrescente como desempate,
    /// estável entre páginas.
    pub async fn listar_chamados(&self, filtros: ChamadoFiltros) -> ChamadoListResponse {
        let inner = self.inner.read().await;

        let mut selecionados: Vec<&Chamado> = inner
            .chamados
            .values()
            .filter(|c| corresponde(c, &filtros))
            .collect();
        selecionados.sort_by(|a, b| {
            b.data_criacao
                .cmp(&a.data_criacao)
                .then(b.id.cmp(&a.id))
        });

        let total = selecionados.len();
        let limit = filtros.limit.max(1);
        let chamados: Vec<ChamadoResponse> = selecionados
            .into_iter()
            .skip(filtros.skip)
            .take(limit)
            .map(|c| inner.response(c))
            .collect();

        ChamadoListResponse {
            chamados,
            total,
            page: filtros.skip / limit + 1,
            size: limit,
            pages: total.div_ceil(limit),
        }
    }

    /// Follow-ups ordenados por `data_criacao` ascendente, id como desempate.
    pub async fn listar_followups(&self, chamado_id: i64) -> Result<Vec<FollowUp>, ChamadosError> {
        let inner = self.inner.read().await;
        if !inner.chamados.contains_key(&chamado_id) {
            return Err(ChamadosError::chamado_nao_encontrado(chamado_id));
        }
        let mut lista = inner.followups.get(&chamado_id).cloned().unwrap_or_default();
        lista.sort_by(|a, b| a.data_criacao.cmp(&b.data_criacao).then(a.id.cmp(&b.id)));
        Ok(lista)
    }

    pub async fn criar_followup(
        &self,
        chamado_id: i64,
        req: FollowUpCreate,
        agora: NaiveDateTime,
    ) -> Result<FollowUp, ChamadosError> {
        let mut inner = self.inner.write().await;
        if !inner.chamados.contains_key(&chamado_id) {
            return Err(ChamadosError::Referential(format!(
                "Chamado {chamado_id} não encontrado"
            )));
        }

        inner.proximo_followup_id += 1;
        let followup = FollowUp {
            id: inner.proximo_followup_id,
            chamado_id,
            tipo: req.tipo,
            descricao: req.descricao,
            data_criacao: agora,
            autor: req.autor,
            anexos: req.anexos,
        };

        inner
            .followups
            .entry(chamado_id)
            .or_default()
            .push(followup.clone());
        if let Some(chamado) = inner.chamados.get_mut(&chamado_id) {
            chamado.data_atualizacao = agora;
        }
        Ok(followup)
    }

    /// Chamado mais o histórico de follow-ups, num único guard de leitura.
    pub async fn contexto_chamado(
        &self,
        id: i64,
    ) -> Result<(Chamado, Vec<FollowUp>), ChamadosError> {
        let inner = self.inner.read().await;
        let chamado = inner
            .chamados
            .get(&id)
            .cloned()
            .ok_or_else(|| ChamadosError::chamado_nao_encontrado(id))?;
        let mut followups = inner.followups.get(&id).cloned().unwrap_or_default();
        followups.sort_by(|a, b| a.data_criacao.cmp(&b.data_criacao).then(a.id.cmp(&b.id)));
        Ok((chamado, followups))
    }

    /// Snapshot de todos os chamados para agregação, sob um único guard.
    pub async fn snapshot(&self) -> Vec<Chamado> {
        let inner = self.inner.read().await;
        inner.chamados.values().cloned().collect()
    }

    /// Snapshot completo (chamados e follow-ups) para análises cruzadas.
    pub async fn snapshot_completo(&self) -> (Vec<Chamado>, BTreeMap<i64, Vec<FollowUp>>) {
        let inner = self.inner.read().await;
        (
            inner.chamados.values().cloned().collect(),
            inner.followups.clone(),
        )
    }
}

fn validar_score(score: i32) -> Result<(), ChamadosError> {
    if !(0..=100).contains(&score) {
        return Err(ChamadosError::Validation(
            "score_qualidade deve estar entre 0 e 100".to_string(),
        ));
    }
    Ok(())
}

fn corresponde(chamado: &Chamado, filtros: &ChamadoFiltros) -> bool {
    if !filtros.status.is_empty() && !filtros.status.contains(&chamado.status) {
        return false;
    }
    if !filtros.criticidade.is_empty() && !filtros.criticidade.contains(&chamado.criticidade) {
        return false;
    }
    if let Some(cliente) = &filtros.cliente {
        if !chamado
            .cliente_solicitante
            .to_lowercase()
            .contains(&cliente.to_lowercase())
        {
            return false;
        }
    }
    if let Some(texto) = &filtros.busca_texto {
        let texto = texto.to_lowercase();
        let encontrado = chamado.descricao.to_lowercase().contains(&texto)
            || chamado.numero_wex.to_lowercase().contains(&texto)
            || chamado.cliente_solicitante.to_lowercase().contains(&texto);
        if !encontrado {
            return false;
        }
    }
    if let Some(inicio) = filtros.data_inicio {
        if chamado.data_criacao < inicio {
            return false;
        }
    }
    if let Some(fim) = filtros.data_fim {
        if chamado.data_criacao > fim {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chamados::types::{StatusChamado, TipoFollowUp};
    use chrono::NaiveDate;

    fn ts(dia: u32, hora: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, dia)
            .unwrap()
            .and_hms_opt(hora, 0, 0)
            .unwrap()
    }

    fn novo_chamado(numero: &str, cliente: &str, descricao: &str) -> ChamadoCreate {
        ChamadoCreate {
            numero_wex: numero.to_string(),
            cliente_solicitante: cliente.to_string(),
            descricao: descricao.to_string(),
            status: StatusChamado::Aberto,
            criticidade: CriticidadeChamado::Media,
            sla_limite: None,
            tags_automaticas: vec![],
            score_qualidade: 50,
            ambiente_informado: false,
            possui_anexos: false,
        }
    }

    fn novo_followup(autor: &str) -> FollowUpCreate {
        FollowUpCreate {
            tipo: TipoFollowUp::Analise,
            descricao: "Análise inicial".to_string(),
            autor: autor.to_string(),
            anexos: vec![],
        }
    }

    #[tokio::test]
    async fn test_criar_e_obter_chamado() {
        let store = ChamadoStore::new();
        let criado = store
            .criar_chamado(novo_chamado("WEX-001", "ABC", "Erro 500"), ts(1, 9))
            .await
            .unwrap();
        assert_eq!(criado.chamado.id, 1);
        assert_eq!(criado.total_followups, 0);
        assert_eq!(criado.chamado.data_criacao, criado.chamado.data_atualizacao);

        let lido = store.obter_chamado(1).await.unwrap();
        assert_eq!(lido.chamado.numero_wex, "WEX-001");
    }

    #[tokio::test]
    async fn test_obter_chamado_inexistente() {
        let store = ChamadoStore::new();
        let err = store.obter_chamado(42).await.unwrap_err();
        assert!(matches!(err, ChamadosError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_numero_wex_duplicado() {
        let store = ChamadoStore::new();
        store
            .criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9))
            .await
            .unwrap();
        let err = store
            .criar_chamado(novo_chamado("WEX-001", "XYZ", "y"), ts(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ChamadosError::Validation(_)));
    }

    #[tokio::test]
    async fn test_score_fora_da_faixa() {
        let store = ChamadoStore::new();
        let mut req = novo_chamado("WEX-001", "ABC", "x");
        req.score_qualidade = 101;
        assert!(matches!(
            store.criar_chamado(req, ts(1, 9)).await.unwrap_err(),
            ChamadosError::Validation(_)
        ));

        let mut req = novo_chamado("WEX-002", "ABC", "x");
        req.score_qualidade = -1;
        assert!(store.criar_chamado(req, ts(1, 9)).await.is_err());
    }

    #[tokio::test]
    async fn test_total_followups_sempre_derivado() {
        let store = ChamadoStore::new();
        store
            .criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9))
            .await
            .unwrap();

        assert_eq!(store.obter_chamado(1).await.unwrap().total_followups, 0);

        store.criar_followup(1, novo_followup("ana"), ts(1, 10)).await.unwrap();
        let depois = store.obter_chamado(1).await.unwrap();
        assert_eq!(depois.total_followups, 1);
        assert_eq!(depois.chamado.data_atualizacao, ts(1, 10));

        store.criar_followup(1, novo_followup("bruno"), ts(1, 11)).await.unwrap();
        store.criar_followup(1, novo_followup("carla"), ts(1, 12)).await.unwrap();

        let followups = store.listar_followups(1).await.unwrap();
        assert_eq!(followups.len(), 3);
        assert_eq!(store.obter_chamado(1).await.unwrap().total_followups, 3);
    }

    #[tokio::test]
    async fn test_followup_para_chamado_inexistente() {
        let store = ChamadoStore::new();
        let err = store
            .criar_followup(7, novo_followup("ana"), ts(1, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, ChamadosError::Referential(_)));
        assert!(store.listar_followups(7).await.is_err());
    }

    #[tokio::test]
    async fn test_followups_ordenados_por_criacao() {
        let store = ChamadoStore::new();
        store
            .criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9))
            .await
            .unwrap();
        store.criar_followup(1, novo_followup("tarde"), ts(3, 9)).await.unwrap();
        store.criar_followup(1, novo_followup("cedo"), ts(2, 9)).await.unwrap();

        let followups = store.listar_followups(1).await.unwrap();
        assert_eq!(followups[0].autor, "cedo");
        assert_eq!(followups[1].autor, "tarde");
    }

    #[tokio::test]
    async fn test_listagem_filtros_combinam_com_and() {
        let store = ChamadoStore::new();
        let mut a = novo_chamado("WEX-001", "Empresa ABC", "Sistema lento no dashboard");
        a.criticidade = CriticidadeChamado::Alta;
        store.criar_chamado(a, ts(1, 9)).await.unwrap();

        let mut b = novo_chamado("WEX-002", "Empresa ABC", "Erro 500 no login");
        b.criticidade = CriticidadeChamado::Critica;
        store.criar_chamado(b, ts(2, 9)).await.unwrap();

        let mut c = novo_chamado("WEX-003", "XYZ Corp", "Sistema lento nas consultas");
        c.criticidade = CriticidadeChamado::Alta;
        store.criar_chamado(c, ts(3, 9)).await.unwrap();

        let filtros = ChamadoFiltros {
            criticidade: vec![CriticidadeChamado::Alta],
            busca_texto: Some("lento".to_string()),
            cliente: Some("abc".to_string()),
            ..Default::default()
        };
        let resposta = store.listar_chamados(filtros).await;
        assert_eq!(resposta.total, 1);
        let unico = &resposta.chamados[0];
        assert_eq!(unico.chamado.numero_wex, "WEX-001");
        assert!(unico
            .chamado
            .cliente_solicitante
            .to_lowercase()
            .contains("abc"));
        assert_eq!(unico.chamado.criticidade, CriticidadeChamado::Alta);
    }

    #[tokio::test]
    async fn test_listagem_status_or_dentro_do_conjunto() {
        let store = ChamadoStore::new();
        for (i, status) in StatusChamado::TODOS.iter().enumerate() {
            let mut req = novo_chamado(&format!("WEX-{i:03}"), "ABC", "x");
            req.status = *status;
            store.criar_chamado(req, ts(1, i as u32 + 1)).await.unwrap();
        }

        let filtros = ChamadoFiltros {
            status: vec![StatusChamado::Aberto, StatusChamado::Fechado],
            ..Default::default()
        };
        let resposta = store.listar_chamados(filtros).await;
        assert_eq!(resposta.total, 2);
        for item in &resposta.chamados {
            assert!(matches!(
                item.chamado.status,
                StatusChamado::Aberto | StatusChamado::Fechado
            ));
        }
    }

    #[tokio::test]
    async fn test_listagem_intervalo_de_datas_inclusivo() {
        let store = ChamadoStore::new();
        for dia in 1..=5 {
            store
                .criar_chamado(novo_chamado(&format!("WEX-{dia:03}"), "ABC", "x"), ts(dia, 9))
                .await
                .unwrap();
        }

        let filtros = ChamadoFiltros {
            data_inicio: Some(ts(2, 9)),
            data_fim: Some(ts(4, 9)),
            ..Default::default()
        };
        let resposta = store.listar_chamados(filtros).await;
        assert_eq!(resposta.total, 3);
    }

    #[tokio::test]
    async fn test_ordenacao_decrescente_por_criacao() {
        let store = ChamadoStore::new();
        store.criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9)).await.unwrap();
        store.criar_chamado(novo_chamado("WEX-002", "ABC", "x"), ts(3, 9)).await.unwrap();
        store.criar_chamado(novo_chamado("WEX-003", "ABC", "x"), ts(2, 9)).await.unwrap();

        let resposta = store.listar_chamados(ChamadoFiltros::default()).await;
        let numeros: Vec<&str> = resposta
            .chamados
            .iter()
            .map(|c| c.chamado.numero_wex.as_str())
            .collect();
        assert_eq!(numeros, vec!["WEX-002", "WEX-003", "WEX-001"]);
    }

    #[tokio::test]
    async fn test_paginacao_cobre_tudo_sem_duplicatas() {
        let store = ChamadoStore::new();
        for i in 0..23 {
            store
                .criar_chamado(
                    novo_chamado(&format!("WEX-{i:03}"), "ABC", "x"),
                    ts(1, 0) + chrono::Duration::minutes(i),
                )
                .await
                .unwrap();
        }

        let mut vistos = Vec::new();
        let mut skip = 0;
        loop {
            let filtros = ChamadoFiltros {
                skip,
                limit: 5,
                ..Default::default()
            };
            let pagina = store.listar_chamados(filtros).await;
            assert_eq!(pagina.total, 23);
            assert_eq!(pagina.pages, 5);
            if pagina.chamados.is_empty() {
                break;
            }
            vistos.extend(pagina.chamados.iter().map(|c| c.chamado.id));
            skip += 5;
        }

        assert_eq!(vistos.len(), 23);
        let mut unicos = vistos.clone();
        unicos.sort_unstable();
        unicos.dedup();
        assert_eq!(unicos.len(), 23);
    }

    #[tokio::test]
    async fn test_pagina_alem_do_fim() {
        let store = ChamadoStore::new();
        store.criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9)).await.unwrap();

        let filtros = ChamadoFiltros {
            skip: 40,
            limit: 20,
            ..Default::default()
        };
        let resposta = store.listar_chamados(filtros).await;
        assert!(resposta.chamados.is_empty());
        assert_eq!(resposta.total, 1);
        assert_eq!(resposta.page, 3);
    }

    #[tokio::test]
    async fn test_atualizar_chamado() {
        let store = ChamadoStore::new();
        store.criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9)).await.unwrap();

        let patch = ChamadoUpdate {
            status: Some(StatusChamado::Resolvido),
            score_qualidade: Some(80),
            ..Default::default()
        };
        let atualizado = store.atualizar_chamado(1, patch, ts(1, 11)).await.unwrap();
        assert_eq!(atualizado.chamado.status, StatusChamado::Resolvido);
        assert_eq!(atualizado.chamado.score_qualidade, 80);
        assert_eq!(atualizado.chamado.data_atualizacao, ts(1, 11));
        assert_eq!(atualizado.chamado.data_criacao, ts(1, 9));
    }

    #[tokio::test]
    async fn test_atualizar_numero_wex_para_existente() {
        let store = ChamadoStore::new();
        store.criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9)).await.unwrap();
        store.criar_chamado(novo_chamado("WEX-002", "ABC", "x"), ts(1, 10)).await.unwrap();

        let patch = ChamadoUpdate {
            numero_wex: Some("WEX-001".to_string()),
            ..Default::default()
        };
        assert!(store.atualizar_chamado(2, patch, ts(1, 11)).await.is_err());

        // manter o próprio número não conflita
        let patch = ChamadoUpdate {
            numero_wex: Some("WEX-002".to_string()),
            ..Default::default()
        };
        assert!(store.atualizar_chamado(2, patch, ts(1, 11)).await.is_ok());
    }

    #[tokio::test]
    async fn test_aplicar_triagem() {
        let store = ChamadoStore::new();
        store.criar_chamado(novo_chamado("WEX-001", "ABC", "x"), ts(1, 9)).await.unwrap();

        let resultado = store
            .aplicar_triagem(
                1,
                CriticidadeChamado::Critica,
                90,
                vec!["performance".to_string()],
                ts(1, 12),
            )
            .await
            .unwrap();
        assert_eq!(resultado.chamado.criticidade, CriticidadeChamado::Critica);
        assert_eq!(resultado.chamado.score_qualidade, 90);
        assert_eq!(resultado.chamado.tags_automaticas, vec!["performance"]);
    }
}
