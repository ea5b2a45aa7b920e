//! SQLite storage for negotiation proposals.
//!
//! Proposals are only written through [`apply_proposal_write`], inside the
//! order repository's transition transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use procura_core::{ProposalRepository, ProposalWrite};
use procura_domain::{
    NegotiationProposal, ProcuraError, ProposalLine, ProposalTerms, Result as DomainResult,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::columns::{
    from_millis, int_to_u32, map_sql_error, parse_decimal, parse_text, run_blocking, to_millis,
    usize_to_i64,
};
use super::manager::DbManager;

/// SQLite-backed proposal reader.
pub struct SqliteProposalRepository {
    db: Arc<DbManager>,
}

impl SqliteProposalRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProposalRepository for SqliteProposalRepository {
    async fn list_for_order(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> DomainResult<Vec<NegotiationProposal>> {
        let (tenant_id, order_id) = (tenant_id.to_string(), order_id.to_string());
        run_blocking(&self.db, move |conn| load_proposals(conn, &tenant_id, &order_id)).await
    }
}

/// Load every proposal of an order, newest first.
pub(crate) fn load_proposals(
    conn: &Connection,
    tenant_id: &str,
    order_id: &str,
) -> DomainResult<Vec<NegotiationProposal>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, order_id, tenant_id, author_role, author_name, status,
                    minimum_order_value, valid_until, delivery_lead_time_days, notes,
                    created_at, resolved_at
             FROM negotiation_proposals
             WHERE tenant_id = ?1 AND order_id = ?2
             ORDER BY created_at DESC, id DESC",
        )
        .map_err(map_sql_error)?;
    let mut proposals = stmt
        .query_map(params![tenant_id, order_id], map_proposal_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;

    let mut lines_stmt = conn
        .prepare(
            "SELECT order_line_id, quantity, discount_pct, bonus_quantity
             FROM proposal_lines
             WHERE proposal_id = ?1
             ORDER BY position ASC",
        )
        .map_err(map_sql_error)?;
    for proposal in &mut proposals {
        proposal.lines = lines_stmt
            .query_map(params![proposal.id], map_proposal_line_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;
    }

    Ok(proposals)
}

/// Apply one ledger write on the caller's transaction.
pub(crate) fn apply_proposal_write(
    conn: &Connection,
    tenant_id: &str,
    order_id: &str,
    write: &ProposalWrite,
) -> DomainResult<()> {
    match write {
        ProposalWrite::Insert(proposal) => insert_proposal(conn, proposal).map_err(map_sql_error),
        ProposalWrite::SetStatus { proposal_id, status, resolved_at } => {
            let updated = conn
                .execute(
                    "UPDATE negotiation_proposals SET status = ?1, resolved_at = ?2
                     WHERE tenant_id = ?3 AND order_id = ?4 AND id = ?5",
                    params![
                        status.to_string(),
                        resolved_at.map(to_millis),
                        tenant_id,
                        order_id,
                        proposal_id,
                    ],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(ProcuraError::NotFound(format!("proposal {proposal_id}")));
            }
            Ok(())
        }
    }
}

fn insert_proposal(conn: &Connection, proposal: &NegotiationProposal) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO negotiation_proposals (
            id, order_id, tenant_id, author_role, author_name, status, minimum_order_value,
            valid_until, delivery_lead_time_days, notes, created_at, resolved_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            proposal.id,
            proposal.order_id,
            proposal.tenant_id,
            proposal.author_role.to_string(),
            proposal.author_name,
            proposal.status.to_string(),
            proposal.terms.minimum_order_value.map(|value| value.to_string()),
            proposal.terms.valid_until.map(|date| date.to_string()),
            proposal.terms.delivery_lead_time_days,
            proposal.terms.notes,
            to_millis(proposal.created_at),
            proposal.resolved_at.map(to_millis),
        ],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO proposal_lines (
            proposal_id, order_line_id, position, quantity, discount_pct, bonus_quantity
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (position, line) in proposal.lines.iter().enumerate() {
        stmt.execute(params![
            proposal.id,
            line.order_line_id,
            usize_to_i64(position),
            line.quantity,
            line.discount_pct.to_string(),
            line.bonus_quantity,
        ])?;
    }
    Ok(())
}

fn map_proposal_row(row: &Row<'_>) -> rusqlite::Result<NegotiationProposal> {
    let author_role: String = row.get(3)?;
    let status: String = row.get(5)?;
    let minimum_order_value: Option<String> = row.get(6)?;
    let valid_until: Option<String> = row.get(7)?;
    let lead_time: Option<i64> = row.get(8)?;
    let resolved_at: Option<i64> = row.get(11)?;

    Ok(NegotiationProposal {
        id: row.get(0)?,
        order_id: row.get(1)?,
        tenant_id: row.get(2)?,
        author_role: parse_text(3, &author_role)?,
        author_name: row.get(4)?,
        status: parse_text(5, &status)?,
        terms: ProposalTerms {
            minimum_order_value: minimum_order_value
                .as_deref()
                .map(|raw| parse_decimal(6, raw))
                .transpose()?,
            valid_until: valid_until.as_deref().map(parse_date).transpose()?,
            delivery_lead_time_days: lead_time.map(|days| int_to_u32(8, days)).transpose()?,
            notes: row.get(9)?,
        },
        lines: Vec::new(),
        created_at: from_millis(10, row.get(10)?)?,
        resolved_at: resolved_at.map(|ms| from_millis(11, ms)).transpose()?,
    })
}

fn map_proposal_line_row(row: &Row<'_>) -> rusqlite::Result<ProposalLine> {
    let discount: String = row.get(2)?;
    Ok(ProposalLine {
        order_line_id: row.get(0)?,
        quantity: int_to_u32(1, row.get(1)?)?,
        discount_pct: parse_decimal(2, &discount)?,
        bonus_quantity: int_to_u32(3, row.get(3)?)?,
    })
}

fn parse_date(raw: &str) -> rusqlite::Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(err)))
}
