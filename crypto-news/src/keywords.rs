//! Keyword dictionaries behind validation and classification.
//!
//! The built-in tables are plain data so that a deployment can replace any of
//! them from the config file without touching the matching code. Bump
//! [`DICTIONARY_VERSION`] whenever the built-in lists change.

use crate::utils::text::NormalizedText;
use interfaces::Category;
use serde::{Deserialize, Serialize};

pub const DICTIONARY_VERSION: &str = "2025.10.1";

const TRUSTED_SOURCES: &[&str] = &[
    "CoinDesk", "Cointelegraph", "Decrypt", "The Block", "Bitcoin Magazine", "CryptoSlate",
    "The Defiant", "Blockworks", "BeInCrypto", "CryptoNews", "Bitcoinist", "NewsBTC",
    "CryptoPotato", "U.Today",
];

const AGGREGATOR_SOURCES: &[&str] = &["Google News", "Bing News", "CryptoPanic", "Yahoo News"];

/// Topics that disqualify an item even from a trusted publisher.
const TRUSTED_SOURCE_BLACKLIST: &[&str] = &[
    "nfl", "nba", "mlb", "nhl", "premier league", "champions league", "super bowl", "world cup",
    "student loan", "student loans", "medicare", "medicaid", "immigration policy",
];

const HARD_BLACKLIST: &[&str] = &[
    "s&p 500", "dow jones", "nasdaq", "ftse 100", "nikkei", "russell 2000", "treasury",
    "treasuries", "crude oil", "gold futures", "mortgage rates", "team", "nfl", "nba", "mlb",
    "premier league", "super bowl", "world cup", "box office", "celebrity", "horoscope",
    "recipe", "student loan", "medicare", "medicaid", "immigration", "zacks",
];

/// Blacklisted words that crypto coverage uses legitimately; tolerated when a
/// network is mentioned.
const PERMITTED_WITH_NETWORK: &[&str] = &["treasury", "treasuries", "team", "nasdaq"];

const STRONG_INDICATORS: &[&str] = &[
    "blockchain", "smart contract", "smart contracts", "cryptocurrency", "cryptocurrencies",
    "crypto", "bitcoin", "ethereum", "defi", "decentralized finance", "stablecoin",
    "stablecoins", "nft", "nfts", "web3", "crypto exchange", "crypto wallet", "proof of stake",
    "proof of work", "altcoin", "altcoins", "crypto asset", "crypto assets",
];

const MEDIUM_INDICATORS: &[&str] = &[
    "digital asset", "digital assets", "token price", "tokenization", "tokenized", "on-chain",
    "onchain", "staking", "airdrop", "market cap", "trading volume", "exchange listing",
    "hard fork", "halving", "validators", "hash rate", "hashrate", "gas fees", "liquidity pool",
    "yield farming", "cold storage", "private key", "seed phrase", "spot etf", "memecoin",
];

const WEAK_INDICATORS: &[&str] = &[
    "token", "tokens", "chain", "coin", "coins", "wallet", "wallets", "exchange", "mining",
    "miners", "ledger", "node", "nodes", "protocol", "mainnet", "testnet", "fork", "bridge",
];

const CRYPTO_CONTEXT: &[&str] = &[
    "crypto", "digital currency", "digital currencies", "virtual currency", "virtual asset",
    "virtual assets", "digital assets", "decentralized", "tokenomics",
];

const TRADITIONAL_MARKET: &[&str] = &[
    "stocks", "stock market", "equities", "shares", "wall street", "nasdaq", "s&p 500",
    "dow jones", "bond yields", "treasury yields", "interest rate", "interest rates",
    "rate cut", "rate hike", "earnings", "federal reserve", "the fed", "investor sentiment",
    "consumer confidence",
];

const URGENCY_KEYWORDS: &[&str] =
    &["breaking", "just in", "urgent", "alert", "flash", "developing"];

/// Networks tracked for the site's clients. Listed first in the network
/// table so that they win over generic networks.
pub const CLIENT_NETWORKS: &[&str] = &["Hedera", "XDC Network", "Algorand", "Constellation"];

/// Network table in priority order.
const NETWORKS: &[(&str, &[&str])] = &[
    ("Hedera", &["hedera", "hbar", "hashgraph", "hedera hashgraph"]),
    ("XDC Network", &["xdc", "xdc network", "xinfin"]),
    ("Algorand", &["algorand"]),
    ("Constellation", &["constellation network", "constellation dag", "hypergraph"]),
    ("Bitcoin", &["bitcoin", "btc", "satoshi nakamoto", "lightning network"]),
    ("Ethereum", &["ethereum", "eth", "ether", "vitalik buterin"]),
    ("Solana", &["solana"]),
    ("XRP", &["xrp", "ripple", "xrpl", "xrp ledger"]),
    ("Cardano", &["cardano"]),
    ("Polkadot", &["polkadot"]),
    ("Avalanche", &["avalanche", "avax"]),
    ("Polygon", &["polygon", "matic"]),
    ("Chainlink", &["chainlink"]),
    ("Optimism", &["optimism", "op mainnet", "superchain", "op stack"]),
    ("Arbitrum", &["arbitrum"]),
    ("NEAR", &["near protocol"]),
    ("Cosmos", &["cosmos", "cosmos hub"]),
    ("Dogecoin", &["dogecoin", "doge"]),
    ("Tron", &["tron", "trx"]),
    ("Litecoin", &["litecoin", "ltc"]),
    ("BNB Chain", &["bnb", "bnb chain", "binance smart chain"]),
    ("Sui", &["sui network"]),
    ("TON", &["toncoin", "the open network"]),
];

/// Network names that are also everyday English words.
const AMBIGUOUS_TERMS: &[(&str, &[&str])] = &[
    (
        "optimism",
        &[
            "layer 2", "l2", "rollup", "rollups", "op mainnet", "op token", "superchain",
            "op stack", "optimism network", "optimism foundation", "ethereum",
        ],
    ),
    (
        "avalanche",
        &["avax", "subnet", "subnets", "c chain", "avalanche network", "avalanche foundation", "blockchain"],
    ),
    (
        "polygon",
        &["matic", "pol token", "zkevm", "polygon network", "polygon labs", "layer 2", "blockchain"],
    ),
    ("cosmos", &["atom", "ibc", "cosmos hub", "cosmos sdk", "interchain", "blockchain"]),
    ("tron", &["trx", "justin sun", "tron network", "tron dao", "blockchain"]),
];

const CATEGORIES: &[(Category, &[&str])] = &[
    (
        Category::Market,
        &[
            "price", "prices", "rally", "rallies", "surge", "surges", "plunge", "plunges", "crash",
            "trading", "traders", "market cap", "bull", "bear", "bullish", "bearish", "etf",
            "inflows", "outflows", "liquidation", "liquidations", "all time high", "sell off",
            "selloff", "volatility",
        ],
    ),
    (
        Category::Regulation,
        &[
            "regulation", "regulations", "regulatory", "regulator", "regulators", "sec", "cftc",
            "lawsuit", "court", "legislation", "bill", "compliance", "ban", "sanctions",
            "license", "licence", "congress", "senate", "enforcement", "policy",
        ],
    ),
    (
        Category::Technology,
        &[
            "upgrade", "mainnet", "testnet", "smart contract", "layer 2", "rollup", "scalability",
            "developer", "developers", "integration", "hard fork", "zero knowledge", "zk",
            "interoperability", "bridge", "node", "wallet", "launches", "protocol",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousTerm {
    pub term: String,
    /// Technical context that makes `term` a crypto signal.
    pub qualifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dictionaries {
    pub version: String,
    pub trusted_sources: Vec<String>,
    pub aggregator_sources: Vec<String>,
    pub trusted_source_blacklist: Vec<String>,
    pub hard_blacklist: Vec<String>,
    pub permitted_with_network: Vec<String>,
    pub strong: Vec<String>,
    pub medium: Vec<String>,
    pub weak: Vec<String>,
    pub crypto_context: Vec<String>,
    pub traditional_market: Vec<String>,
    pub urgency: Vec<String>,
    pub ambiguous: Vec<AmbiguousTerm>,
    /// Checked in order; the first match wins.
    pub networks: Vec<NetworkKeywords>,
    /// Checked in order; the first match wins.
    pub categories: Vec<CategoryKeywords>,
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

impl Default for Dictionaries {
    fn default() -> Self {
        Self {
            version: DICTIONARY_VERSION.to_string(),
            trusted_sources: owned(TRUSTED_SOURCES),
            aggregator_sources: owned(AGGREGATOR_SOURCES),
            trusted_source_blacklist: owned(TRUSTED_SOURCE_BLACKLIST),
            hard_blacklist: owned(HARD_BLACKLIST),
            permitted_with_network: owned(PERMITTED_WITH_NETWORK),
            strong: owned(STRONG_INDICATORS),
            medium: owned(MEDIUM_INDICATORS),
            weak: owned(WEAK_INDICATORS),
            crypto_context: owned(CRYPTO_CONTEXT),
            traditional_market: owned(TRADITIONAL_MARKET),
            urgency: owned(URGENCY_KEYWORDS),
            ambiguous: AMBIGUOUS_TERMS
                .iter()
                .map(|(term, qualifiers)| AmbiguousTerm {
                    term: term.to_string(),
                    qualifiers: owned(qualifiers),
                })
                .collect(),
            networks: NETWORKS
                .iter()
                .map(|(name, keywords)| NetworkKeywords {
                    name: name.to_string(),
                    keywords: owned(keywords),
                })
                .collect(),
            categories: CATEGORIES
                .iter()
                .map(|(category, keywords)| CategoryKeywords {
                    category: *category,
                    keywords: owned(keywords),
                })
                .collect(),
        }
    }
}

impl Dictionaries {
    fn label_in(label: &str, list: &[String]) -> bool {
        let label = NormalizedText::new(label);
        !label.is_empty() && list.iter().any(|entry| NormalizedText::new(entry) == label)
    }

    pub fn is_trusted_source(&self, source_label: &str) -> bool {
        Self::label_in(source_label, &self.trusted_sources)
    }

    pub fn is_aggregator_source(&self, source_label: &str) -> bool {
        Self::label_in(source_label, &self.aggregator_sources)
    }

    fn ambiguous_entry(&self, keyword: &str) -> Option<&AmbiguousTerm> {
        self.ambiguous
            .iter()
            .find(|entry| entry.term.eq_ignore_ascii_case(keyword))
    }

    /// Whether `keyword` counts as a crypto signal in `text`: plain keywords
    /// always do, ambiguous ones only next to one of their qualifiers.
    fn signals(&self, text: &NormalizedText, keyword: &str) -> bool {
        if !text.contains(keyword) {
            return false;
        }
        match self.ambiguous_entry(keyword) {
            Some(entry) => text.contains_any(&entry.qualifiers),
            None => true,
        }
    }

    /// Ambiguous terms present in `text` without any qualifier.
    pub fn unqualified_ambiguous<'a>(&'a self, text: &NormalizedText) -> Vec<&'a str> {
        self.ambiguous
            .iter()
            .filter(|entry| text.contains(&entry.term) && !text.contains_any(&entry.qualifiers))
            .map(|entry| entry.term.as_str())
            .collect()
    }

    /// Network keywords in `text` that count as crypto signals.
    pub fn network_terms<'a>(&'a self, text: &NormalizedText) -> Vec<&'a str> {
        let mut terms: Vec<&str> = Vec::new();
        for network in &self.networks {
            for keyword in &network.keywords {
                if !terms.contains(&keyword.as_str()) && self.signals(text, keyword) {
                    terms.push(keyword);
                }
            }
        }
        terms
    }

    /// First network, in table order, with a keyword signalled in `text`.
    pub fn first_network(&self, text: &NormalizedText) -> Option<&NetworkKeywords> {
        self.networks
            .iter()
            .find(|network| network.keywords.iter().any(|k| self.signals(text, k)))
    }

    pub fn first_category(&self, text: &NormalizedText) -> Option<Category> {
        self.categories
            .iter()
            .find(|entry| text.contains_any(&entry.keywords))
            .map(|entry| entry.category)
    }
}
