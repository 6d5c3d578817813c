//! Solidity struct definitions for EIP-712 signing.
//!
//! `Agent` is signed as-is under the phantom-agent domain. The others are the
//! user-signed schemas; on the wire their type name carries the
//! `HyperliquidTransaction:` prefix, so only their field lists are taken from here.

use alloy::sol;

sol! {
    struct Agent {
        string source;
        bytes32 connectionId;
    }

    struct UsdSend {
        string hyperliquidChain;
        string destination;
        string amount;
        uint64 time;
    }

    struct Withdraw {
        string hyperliquidChain;
        string destination;
        string amount;
        uint64 time;
    }

    struct SpotSend {
        string hyperliquidChain;
        string destination;
        string token;
        string amount;
        uint64 time;
    }

    struct UsdClassTransfer {
        string hyperliquidChain;
        string amount;
        bool toPerp;
        uint64 nonce;
    }

    struct ApproveAgent {
        string hyperliquidChain;
        address agentAddress;
        string agentName;
        uint64 nonce;
    }

    struct ApproveBuilderFee {
        string hyperliquidChain;
        string maxFeeRate;
        address builder;
        uint64 nonce;
    }
}
