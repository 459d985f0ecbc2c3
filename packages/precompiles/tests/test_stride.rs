//! Integration tests for the Stride outpost precompile.
//!
//! Covers liquid stake packet construction (autopilot memo, Stride receiver,
//! bond denomination), escrow and the LiquidStake event.

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};
use cosmwasm_std::testing::{mock_env, MockStorage};
use cosmwasm_std::{BlockInfo, Uint256};

use precompiles::address_codec::{encode_bech32, to_canonical};
use precompiles::testing::{MockBank, MockTransfer};
use precompiles::{
    BankKeeper, CallContext, Height, IStrideOutpost, Precompile, PrecompileConfig,
    PrecompileError, Reverted, RunOutput, StrideOutpost, STRIDE_OUTPOST_ADDRESS,
};

// ============================================================================
// Test Setup
// ============================================================================

const DENOM: &str = "aevmos";

type Outpost = StrideOutpost<MockTransfer>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn user() -> Address {
    Address::repeat_byte(0x0a)
}

fn stride_receiver() -> String {
    encode_bech32(&[0x33; 20], "stride").unwrap()
}

fn setup() -> (MockStorage, BlockInfo, Outpost) {
    init_tracing();
    let mut storage = MockStorage::new();
    MockBank::mint(&mut storage, &to_canonical(&user()), DENOM, 10_000u128.into()).unwrap();

    let outpost = StrideOutpost::new(MockTransfer, PrecompileConfig::default()).unwrap();
    (storage, mock_env().block, outpost)
}

fn call(
    outpost: &Outpost,
    storage: &mut MockStorage,
    block: &BlockInfo,
    caller: Address,
    input: &[u8],
) -> Result<RunOutput, Reverted> {
    let mut ctx = CallContext::new(storage, block, caller, user());
    outpost.run(&mut ctx, input)
}

fn stake_input(denom: &str, amount: u64, receiver: &str) -> Vec<u8> {
    IStrideOutpost::liquidStakeCall {
        token: IStrideOutpost::Coin {
            denom: denom.to_string(),
            amount: U256::from(amount),
        },
        receiver: receiver.to_string(),
    }
    .abi_encode()
}

fn balance(storage: &MockStorage, account: Address) -> Uint256 {
    MockBank
        .balance(storage, &to_canonical(&account), DENOM)
        .unwrap()
}

// ============================================================================
// Liquid Stake
// ============================================================================

#[test]
fn test_liquid_stake_submits_packet() {
    let (mut storage, block, outpost) = setup();
    let receiver = stride_receiver();

    let out = call(&outpost, &mut storage, &block, user(), &stake_input(DENOM, 1000, &receiver)).unwrap();
    assert!(IStrideOutpost::liquidStakeCall::abi_decode_returns(&out.output, true).unwrap()._0);

    let packet = MockTransfer::packet(&storage, 1).unwrap().unwrap();
    assert_eq!(packet.source_port, "transfer");
    assert_eq!(packet.source_channel, "channel-25");
    assert_eq!(packet.receiver, receiver);
    assert!(packet.sender.starts_with("evmos1"));
    assert_eq!(packet.timeout_height, Height::new(14002, block.height + 100));
    assert_eq!(
        packet.memo,
        format!(
            r#"{{"autopilot":{{"receiver":"{0}","stakeibc":{{"action":"LiquidStake","stride_address":"{0}"}}}}}}"#,
            receiver
        )
    );

    assert_eq!(balance(&storage, user()), Uint256::from(9000u128));
    let escrow = MockTransfer::escrow_address("transfer", "channel-25");
    assert_eq!(
        MockBank.balance(&storage, &escrow, DENOM).unwrap(),
        Uint256::from(1000u128)
    );

    assert_eq!(out.logs.len(), 1);
    assert_eq!(out.logs[0].address, STRIDE_OUTPOST_ADDRESS);
    let event = IStrideOutpost::LiquidStake::decode_log_data(&out.logs[0].data, true).unwrap();
    assert_eq!(event.sender, user());
    assert_eq!(event.receiver, receiver);
    assert_eq!(event.sourceChannel, "channel-25");
    assert_eq!(event.denom, DENOM);
    assert_eq!(event.amount, U256::from(1000u64));
}

#[test]
fn test_liquid_stake_requires_stride_receiver() {
    let (mut storage, block, outpost) = setup();
    let receiver = encode_bech32(&[0x33; 20], "osmo").unwrap();

    let err = call(&outpost, &mut storage, &block, user(), &stake_input(DENOM, 1000, &receiver))
        .unwrap_err();
    assert_eq!(
        err.reason,
        PrecompileError::InvalidReceiver {
            address: receiver,
            reason: "receiver address is not a stride address".to_string(),
        }
        .to_string()
    );

    let err = call(&outpost, &mut storage, &block, user(), &stake_input(DENOM, 1000, "stride1invalid"))
        .unwrap_err();
    assert!(err.reason.starts_with("invalid receiver address stride1invalid"));
    assert_eq!(MockTransfer::last_sequence(&storage).unwrap(), 0);
}

#[test]
fn test_liquid_stake_only_bond_denom() {
    let (mut storage, block, outpost) = setup();

    let err = call(&outpost, &mut storage, &block, user(), &stake_input("uosmo", 1, &stride_receiver()))
        .unwrap_err();
    assert!(err.reason.starts_with("invalid coin"));
}

#[test]
fn test_liquid_stake_caller_must_be_origin() {
    let (mut storage, block, outpost) = setup();
    let contract = Address::repeat_byte(0xc0);

    let err = call(&outpost, &mut storage, &block, contract, &stake_input(DENOM, 1, &stride_receiver()))
        .unwrap_err();
    assert_eq!(
        err.reason,
        PrecompileError::DifferentOrigin {
            origin: user().to_string(),
            sender: contract.to_string(),
        }
        .to_string()
    );
    assert_eq!(balance(&storage, user()), Uint256::from(10_000u128));
}

#[test]
fn test_liquid_stake_insufficient_funds() {
    let (mut storage, block, outpost) = setup();

    let err = call(&outpost, &mut storage, &block, user(), &stake_input(DENOM, 10_001, &stride_receiver()))
        .unwrap_err();
    assert!(err.reason.contains("insufficient funds"));
    assert_eq!(MockTransfer::last_sequence(&storage).unwrap(), 0);
}

#[test]
fn test_liquid_stake_read_only() {
    let (mut storage, block, outpost) = setup();

    let mut ctx = CallContext::new(&mut storage, &block, user(), user()).read_only();
    let err = outpost
        .run(&mut ctx, &stake_input(DENOM, 1, &stride_receiver()))
        .unwrap_err();
    assert!(err.reason.starts_with("write protection"));
}
