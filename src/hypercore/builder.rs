//! Action construction from coin-level requests.
//!
//! Orders, cancels and modifications name their market by coin symbol; the wire
//! format wants an asset index. [`ActionBuilder`] resolves symbols through an
//! [`AssetResolver`] and assembles the [`Action`].

use std::{
    collections::{HashMap, HashSet},
    future::Future,
    hash::BuildHasher,
};

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;

use super::{
    Error, Result,
    types::{
        Action, BatchCancel, BatchCancelCloid, BatchModify, BatchOrder, BuilderInfo, BuilderWire,
        CancelByCloidRequest, CancelByCloidWire, CancelRequest, CancelWire, Modify,
        ModifyRequest, Order, OrderGrouping, OrderWire, ScheduleCancel, SetReferrer,
        UpdateIsolatedMargin, UpdateLeverage, VaultTransfer,
    },
    wire,
};

/// Maps a coin symbol to its asset index.
///
/// Usually backed by exchange metadata fetched ahead of time. `None` means the
/// coin is unknown.
pub trait AssetResolver {
    fn resolve(&self, coin: &str) -> impl Future<Output = Option<u32>>;
}

impl<S: BuildHasher> AssetResolver for HashMap<String, u32, S> {
    fn resolve(&self, coin: &str) -> impl Future<Output = Option<u32>> {
        std::future::ready(self.get(coin).copied())
    }
}

/// Builds actions, resolving coin symbols through `R`.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
///
/// use hypersign::hypercore::{
///     ActionBuilder,
///     types::{Order, OrderGrouping, OrderType, TimeInForce},
/// };
/// use rust_decimal::dec;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let assets = HashMap::from([("ETH".to_owned(), 4)]);
/// let builder = ActionBuilder::new(&assets);
///
/// let action = builder
///     .order_action(
///         &[Order {
///             coin: "ETH".into(),
///             is_buy: true,
///             sz: dec!(0.1),
///             limit_px: dec!(2500),
///             order_type: OrderType::limit(TimeInForce::Gtc),
///             reduce_only: false,
///             cloid: None,
///         }],
///         OrderGrouping::Na,
///         None,
///     )
///     .await
///     .unwrap();
/// assert_eq!(action.kind(), "order");
/// # }
/// ```
#[derive(Debug)]
pub struct ActionBuilder<'a, R> {
    resolver: &'a R,
}

impl<'a, R: AssetResolver> ActionBuilder<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Resolves every distinct coin once, concurrently.
    ///
    /// Fails with the first unknown coin in the order given.
    async fn resolve_all<'c>(
        &self,
        coins: impl IntoIterator<Item = &'c str>,
    ) -> Result<HashMap<&'c str, u32>> {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = coins.into_iter().filter(|coin| seen.insert(*coin)).collect();

        let resolved = join_all(distinct.iter().map(|coin| self.resolver.resolve(coin))).await;

        let mut assets = HashMap::with_capacity(distinct.len());
        for (coin, asset) in distinct.into_iter().zip(resolved) {
            let asset = asset.ok_or_else(|| Error::UnknownAsset {
                coin: coin.to_owned(),
            })?;
            assets.insert(coin, asset);
        }
        log::trace!("resolved assets {assets:?}");
        Ok(assets)
    }

    async fn resolve(&self, coin: &str) -> Result<u32> {
        self.resolver
            .resolve(coin)
            .await
            .ok_or_else(|| Error::UnknownAsset {
                coin: coin.to_owned(),
            })
    }

    /// `order`: a batch of orders, with an optional builder fee.
    pub async fn order_action(
        &self,
        orders: &[Order],
        grouping: OrderGrouping,
        builder: Option<BuilderInfo>,
    ) -> Result<Action> {
        let assets = self
            .resolve_all(orders.iter().map(|order| order.coin.as_str()))
            .await?;

        let wires = orders
            .iter()
            .map(|order| wire::order_to_wire(order, assets[order.coin.as_str()]))
            .collect::<Result<Vec<_>>>()?;

        Ok(order_wires_to_action(wires, grouping, builder))
    }

    /// `cancel`: cancel orders by exchange id.
    pub async fn cancel_action(&self, cancels: &[CancelRequest]) -> Result<Action> {
        let assets = self
            .resolve_all(cancels.iter().map(|cancel| cancel.coin.as_str()))
            .await?;

        Ok(Action::Cancel(BatchCancel {
            cancels: cancels
                .iter()
                .map(|cancel| CancelWire {
                    a: assets[cancel.coin.as_str()],
                    o: cancel.oid,
                })
                .collect(),
        }))
    }

    /// `cancelByCloid`: cancel orders by client id.
    pub async fn cancel_by_cloid_action(&self, cancels: &[CancelByCloidRequest]) -> Result<Action> {
        let assets = self
            .resolve_all(cancels.iter().map(|cancel| cancel.coin.as_str()))
            .await?;

        Ok(Action::CancelByCloid(BatchCancelCloid {
            cancels: cancels
                .iter()
                .map(|cancel| CancelByCloidWire {
                    asset: assets[cancel.coin.as_str()],
                    cloid: cancel.cloid,
                })
                .collect(),
        }))
    }

    /// `modify`: replace a single order.
    pub async fn modify_action(&self, modify: &ModifyRequest) -> Result<Action> {
        let asset = self.resolve(&modify.order.coin).await?;
        Ok(Action::Modify(Modify {
            oid: modify.oid,
            order: wire::order_to_wire(&modify.order, asset)?,
        }))
    }

    /// `batchModify`: replace several orders at once.
    pub async fn batch_modify_action(&self, modifies: &[ModifyRequest]) -> Result<Action> {
        let assets = self
            .resolve_all(modifies.iter().map(|modify| modify.order.coin.as_str()))
            .await?;

        let modifies = modifies
            .iter()
            .map(|modify| {
                Ok(Modify {
                    oid: modify.oid,
                    order: wire::order_to_wire(
                        &modify.order,
                        assets[modify.order.coin.as_str()],
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Action::BatchModify(BatchModify { modifies }))
    }

    /// `updateLeverage`.
    pub async fn update_leverage_action(
        &self,
        coin: &str,
        leverage: u32,
        is_cross: bool,
    ) -> Result<Action> {
        let asset = self.resolve(coin).await?;
        Ok(Action::UpdateLeverage(UpdateLeverage {
            asset,
            is_cross,
            leverage,
        }))
    }

    /// `updateIsolatedMargin`: add (positive) or remove (negative) margin, in USD.
    pub async fn update_isolated_margin_action(
        &self,
        coin: &str,
        is_buy: bool,
        amount: Decimal,
    ) -> Result<Action> {
        let asset = self.resolve(coin).await?;
        Ok(Action::UpdateIsolatedMargin(UpdateIsolatedMargin {
            asset,
            is_buy,
            ntli: wire::decimal_to_usd_int(amount)?,
        }))
    }

    /// `vaultTransfer`: deposit into or withdraw from a vault, in USD.
    pub fn vault_transfer_action(
        &self,
        vault_address: Address,
        is_deposit: bool,
        usd: Decimal,
    ) -> Result<Action> {
        let micro_usd = wire::decimal_to_usd_int(usd)?;
        let usd = u64::try_from(micro_usd).map_err(|_| Error::rounding(usd))?;
        Ok(Action::VaultTransfer(VaultTransfer {
            vault_address,
            is_deposit,
            usd,
        }))
    }

    /// `scheduleCancel`: cancel all open orders at `time`, or clear the schedule.
    ///
    /// Times before the Unix epoch are sent as 0.
    pub fn schedule_cancel_action(&self, time: Option<DateTime<Utc>>) -> Action {
        Action::ScheduleCancel(ScheduleCancel {
            time: time.map(super::unix_millis),
        })
    }

    /// `setReferrer`.
    pub fn set_referrer_action(&self, code: impl Into<String>) -> Action {
        Action::SetReferrer(SetReferrer { code: code.into() })
    }
}

/// Wraps already encoded orders into an `order` action.
///
/// The builder address is lowercased on the wire.
pub fn order_wires_to_action(
    orders: Vec<OrderWire>,
    grouping: OrderGrouping,
    builder: Option<BuilderInfo>,
) -> Action {
    Action::Order(BatchOrder {
        orders,
        grouping,
        builder: builder.map(|builder| BuilderWire {
            b: builder.address,
            f: builder.fee,
        }),
    })
}
