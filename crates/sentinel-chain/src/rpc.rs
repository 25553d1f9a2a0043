//! `alloy`-backed implementation of [`ChainClient`].
//!
//! One instance per configured chain, holding a websocket provider for
//! subscriptions and reusing it for one-off calls.

use crate::backoff::{retry_with_backoff, BackoffConfig};
use crate::client::{ChainClient, FactoryCandidate, MarketEvent, SwapQuote};
use crate::error::{ChainError, ChainResult};
use crate::events::{
    PoolCreatedEvent, Reserves, Slot0, V2MintEvent, V2SwapEvent, V3SwapEvent, PAIR_CREATED_SIG,
    POOL_CREATED_SIG, V2_MINT_SIG, V2_SWAP_SIG, V3_SWAP_SIG,
};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use async_trait::async_trait;
use futures_util::StreamExt;
use sentinel_core::Chain;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }

    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }

    #[sol(rpc)]
    interface IUniswapV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }

    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked);
    }

    #[sol(rpc)]
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }

    #[sol(rpc)]
    interface IUniswapV3Quoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
    }
}

/// Which DEX-family factory/router/quoter contracts to watch on a chain.
#[derive(Debug, Clone)]
pub struct DexFamilyConfig {
    pub name: String,
    pub v2_factory: Option<Address>,
    pub v2_router: Option<Address>,
    pub v3_factory: Option<Address>,
    pub v3_quoter: Option<Address>,
}

/// Concrete `ChainClient` talking to a real node over HTTP (calls) and
/// websocket (subscriptions).
pub struct AlloyChainClient<P> {
    chain: Chain,
    provider: P,
    dex_families: Vec<DexFamilyConfig>,
    backoff: BackoffConfig,
}

impl<P> AlloyChainClient<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    pub fn new(chain: Chain, provider: P, dex_families: Vec<DexFamilyConfig>) -> Self {
        Self {
            chain,
            provider,
            dex_families,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Connects a websocket provider for a chain's RPC endpoint, suitable
/// for constructing [`AlloyChainClient`].
pub async fn connect_ws(ws_url: &str) -> ChainResult<impl Provider + Clone> {
    ProviderBuilder::new()
        .connect_ws(WsConnect::new(ws_url))
        .await
        .map_err(|e| ChainError::RpcFailed(e.to_string()))
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn get_code(&self, address: Address) -> ChainResult<Vec<u8>> {
        let provider = self.provider.clone();
        let code = retry_with_backoff(&self.backoff, "get_code", || {
            let provider = provider.clone();
            async move {
                provider
                    .get_code_at(address)
                    .await
                    .map_err(|e| ChainError::RpcFailed(e.to_string()))
            }
        })
        .await?;
        if code.is_empty() {
            return Err(ChainError::NoBytecode(address.to_string()));
        }
        Ok(code.to_vec())
    }

    async fn get_reserves(&self, pair: Address) -> ChainResult<Reserves> {
        let contract = IUniswapV2Pair::new(pair, self.provider.clone());
        let result = retry_with_backoff(&self.backoff, "getReserves", || {
            let contract = &contract;
            async move {
                contract
                    .getReserves()
                    .call()
                    .await
                    .map_err(|e| ChainError::RpcFailed(e.to_string()))
            }
        })
        .await?;
        Ok(Reserves {
            reserve0: U256::from(result.reserve0),
            reserve1: U256::from(result.reserve1),
        })
    }

    async fn get_slot0(&self, pool: Address) -> ChainResult<Slot0> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());
        let result = retry_with_backoff(&self.backoff, "slot0", || {
            let contract = &contract;
            async move {
                contract
                    .slot0()
                    .call()
                    .await
                    .map_err(|e| ChainError::RpcFailed(e.to_string()))
            }
        })
        .await?;
        Ok(Slot0 {
            sqrt_price_x96: U256::from(result.sqrtPriceX96),
            tick: result.tick.as_i32(),
        })
    }

    async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> ChainResult<SwapQuote> {
        let router = self
            .dex_families
            .iter()
            .find_map(|f| f.v2_router)
            .ok_or_else(|| ChainError::RpcFailed("no v2 router configured".into()))?;
        let contract = IUniswapV2Router::new(router, self.provider.clone());
        let path = path.to_vec();
        let amounts = retry_with_backoff(&self.backoff, "getAmountsOut", || {
            let contract = &contract;
            let path = path.clone();
            async move {
                contract
                    .getAmountsOut(amount_in, path)
                    .call()
                    .await
                    .map_err(|e| ChainError::RpcFailed(e.to_string()))
            }
        })
        .await?;
        let amount_out = amounts.amounts.last().copied().unwrap_or(U256::ZERO);
        Ok(SwapQuote { amount_out })
    }

    async fn get_v3_pool(
        &self,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
    ) -> ChainResult<Address> {
        let contract = IUniswapV3Factory::new(factory, self.provider.clone());
        let result = contract
            .getPool(token0, token1, fee)
            .call()
            .await
            .map_err(|e| ChainError::RpcFailed(e.to_string()))?;
        Ok(result.pool)
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> ChainResult<SwapQuote> {
        let contract = IUniswapV3Quoter::new(quoter, self.provider.clone());
        let result = contract
            .quoteExactInputSingle(token_in, token_out, fee, amount_in, U256::ZERO)
            .call()
            .await
            .map_err(|e| ChainError::RpcFailed(e.to_string()))?;
        Ok(SwapQuote {
            amount_out: result.amountOut,
        })
    }

    async fn get_decimals(&self, token: Address) -> ChainResult<u8> {
        let contract = IERC20::new(token, self.provider.clone());
        let result = contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::RpcFailed(e.to_string()))?;
        Ok(result.decimals)
    }

    async fn get_total_supply(&self, token: Address) -> ChainResult<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        let result = contract
            .totalSupply()
            .call()
            .await
            .map_err(|e| ChainError::RpcFailed(e.to_string()))?;
        Ok(result.totalSupply)
    }

    async fn subscribe_factory_events(
        &self,
        tx: mpsc::Sender<FactoryCandidate>,
    ) -> ChainResult<()> {
        let v2_factories: Vec<Address> = self.dex_families.iter().filter_map(|f| f.v2_factory).collect();
        let v3_factories: Vec<Address> = self.dex_families.iter().filter_map(|f| f.v3_factory).collect();

        let mut addresses = v2_factories.clone();
        addresses.extend(v3_factories.clone());
        if addresses.is_empty() {
            return Err(ChainError::RpcFailed("no factories configured".into()));
        }

        let filter = Filter::new()
            .address(addresses)
            .events([PAIR_CREATED_SIG.to_string(), POOL_CREATED_SIG.to_string()]);

        let sub = self
            .provider
            .subscribe_logs(&filter)
            .await
            .map_err(|e| ChainError::SubscriptionDropped(e.to_string()))?;
        let mut stream = sub.into_stream();
        let chain = self.chain;

        info!(chain = %chain, factories = addresses.len(), "factory subscription started");

        while let Some(log) = stream.next().await {
            if let Some(candidate) = decode_factory_log(chain, &log, &v2_factories, &v3_factories) {
                if tx.send(candidate).await.is_err() {
                    warn!(chain = %chain, "factory candidate receiver dropped");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn subscribe_market_events(
        &self,
        market: Address,
        tx: mpsc::Sender<MarketEvent>,
    ) -> ChainResult<()> {
        let filter = Filter::new()
            .address(market)
            .events([
                V2_SWAP_SIG.to_string(),
                V2_MINT_SIG.to_string(),
                V3_SWAP_SIG.to_string(),
            ]);

        let sub = self
            .provider
            .subscribe_logs(&filter)
            .await
            .map_err(|e| ChainError::SubscriptionDropped(e.to_string()))?;
        let mut stream = sub.into_stream();

        while let Some(log) = stream.next().await {
            if let Some(event) = decode_market_log(market, &log) {
                debug!(market = %market, "decoded market event");
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }
        Ok(())
    }
}

fn decode_factory_log(
    chain: Chain,
    log: &Log,
    v2_factories: &[Address],
    v3_factories: &[Address],
) -> Option<FactoryCandidate> {
    let topic0 = log.topic0()?;
    let source = log.address();

    if *topic0 == *PAIR_CREATED_SIG && v2_factories.contains(&source) {
        let data = log.data().data.as_ref();
        if data.len() < 32 {
            return None;
        }
        let pool = Address::from_slice(&data[12..32]);
        let token0 = Address::from_word(*log.topics().get(1)?);
        let token1 = Address::from_word(*log.topics().get(2)?);
        return Some(FactoryCandidate {
            chain,
            event: PoolCreatedEvent {
                market_type: sentinel_core::MarketType::V2,
                pool,
                token0,
                token1,
                fee: None,
            },
        });
    }

    if *topic0 == *POOL_CREATED_SIG && v3_factories.contains(&source) {
        let data = log.data().data.as_ref();
        if data.len() < 64 {
            return None;
        }
        let pool = Address::from_slice(&data[44..64]);
        let token0 = Address::from_word(*log.topics().get(1)?);
        let token1 = Address::from_word(*log.topics().get(2)?);
        let fee_topic = log.topics().get(3)?;
        let fee = u32::from_be_bytes(fee_topic[28..32].try_into().ok()?);
        return Some(FactoryCandidate {
            chain,
            event: PoolCreatedEvent {
                market_type: sentinel_core::MarketType::V3,
                pool,
                token0,
                token1,
                fee: Some(fee),
            },
        });
    }

    None
}

fn decode_market_log(market: Address, log: &Log) -> Option<MarketEvent> {
    let topic0 = log.topic0()?;
    let data = log.data().data.as_ref();

    if *topic0 == *V2_SWAP_SIG {
        if data.len() < 128 {
            return None;
        }
        return Some(MarketEvent::V2Swap(V2SwapEvent {
            pool: market,
            sender: Address::from_word(*log.topics().get(1)?),
            to: Address::from_word(*log.topics().get(2)?),
            amount0_in: U256::from_be_slice(&data[0..32]),
            amount1_in: U256::from_be_slice(&data[32..64]),
            amount0_out: U256::from_be_slice(&data[64..96]),
            amount1_out: U256::from_be_slice(&data[96..128]),
        }));
    }

    if *topic0 == *V2_MINT_SIG {
        if data.len() < 64 {
            return None;
        }
        return Some(MarketEvent::V2Mint(V2MintEvent {
            pool: market,
            sender: Address::from_word(*log.topics().get(1)?),
            amount0: U256::from_be_slice(&data[0..32]),
            amount1: U256::from_be_slice(&data[32..64]),
        }));
    }

    if *topic0 == *V3_SWAP_SIG {
        if data.len() < 160 {
            return None;
        }
        let amount0 = alloy::primitives::I256::from_be_bytes::<32>(data[0..32].try_into().ok()?);
        let amount1 = alloy::primitives::I256::from_be_bytes::<32>(data[32..64].try_into().ok()?);
        let sqrt_price_x96 = U256::from_be_slice(&data[64..96]);
        let liquidity = u128::from_be_bytes(data[112..128].try_into().ok()?);
        let tick = i32::from_be_bytes(data[156..160].try_into().ok()?);
        return Some(MarketEvent::V3Swap(V3SwapEvent {
            pool: market,
            sender: Address::from_word(*log.topics().get(1)?),
            recipient: Address::from_word(*log.topics().get(2)?),
            amount0,
            amount1,
            sqrt_price_x96,
            liquidity,
            tick,
        }));
    }

    None
}
