//! Token balance ledger. Covers crowdsourcer stakes, fee tokens,
//! participation tokens and Cash.

use heed::types::SerdeBincode;
use sneed::{DatabaseUnique, Env, RoTxn, RwTxn};

use crate::{
    state::Error,
    types::{Address, Amount, TokenId},
};

#[derive(Clone)]
pub struct Dbs {
    balances: DatabaseUnique<SerdeBincode<(TokenId, Address)>, SerdeBincode<Amount>>,
    token_supply: DatabaseUnique<SerdeBincode<TokenId>, SerdeBincode<Amount>>,
}

impl Dbs {
    pub const NUM_DBS: u32 = 2;

    pub(in crate::state) fn new(
        env: &Env,
        rwtxn: &mut RwTxn,
    ) -> Result<Self, Error> {
        let balances = DatabaseUnique::create(env, rwtxn, "balances")?;
        let token_supply = DatabaseUnique::create(env, rwtxn, "token_supply")?;
        Ok(Self {
            balances,
            token_supply,
        })
    }

    /// Balance of `owner` in `token`, zero if never credited
    pub fn balance(
        &self,
        rotxn: &RoTxn,
        token: &TokenId,
        owner: &Address,
    ) -> Result<Amount, Error> {
        let balance = self
            .balances
            .try_get(rotxn, &(*token, *owner))?
            .unwrap_or_default();
        Ok(balance)
    }

    pub fn supply(
        &self,
        rotxn: &RoTxn,
        token: &TokenId,
    ) -> Result<Amount, Error> {
        Ok(self.token_supply.try_get(rotxn, token)?.unwrap_or_default())
    }

    fn credit(
        &self,
        rwtxn: &mut RwTxn,
        token: &TokenId,
        owner: &Address,
        amount: Amount,
    ) -> Result<(), Error> {
        let balance = self.balance(rwtxn, token, owner)?.checked_add(amount)?;
        self.balances.put(rwtxn, &(*token, *owner), &balance)?;
        Ok(())
    }

    fn debit(
        &self,
        rwtxn: &mut RwTxn,
        token: &TokenId,
        owner: &Address,
        amount: Amount,
    ) -> Result<(), Error> {
        let balance = self
            .balance(rwtxn, token, owner)?
            .checked_sub(amount)
            .map_err(|source| Error::AmountUnderflow {
                token: *token,
                owner: *owner,
                source,
            })?;
        self.balances.put(rwtxn, &(*token, *owner), &balance)?;
        Ok(())
    }

    pub fn transfer(
        &self,
        rwtxn: &mut RwTxn,
        token: &TokenId,
        from: &Address,
        to: &Address,
        value: Amount,
    ) -> Result<(), Error> {
        self.debit(rwtxn, token, from, value)?;
        self.credit(rwtxn, token, to, value)?;
        Ok(())
    }

    pub fn mint(
        &self,
        rwtxn: &mut RwTxn,
        token: &TokenId,
        target: &Address,
        amount: Amount,
    ) -> Result<(), Error> {
        self.credit(rwtxn, token, target, amount)?;
        let supply = self.supply(rwtxn, token)?.checked_add(amount)?;
        self.token_supply.put(rwtxn, token, &supply)?;
        Ok(())
    }

    pub fn burn(
        &self,
        rwtxn: &mut RwTxn,
        token: &TokenId,
        target: &Address,
        amount: Amount,
    ) -> Result<(), Error> {
        self.debit(rwtxn, token, target, amount)?;
        let supply = self.supply(rwtxn, token)?.checked_sub(amount).map_err(
            |source| Error::AmountUnderflow {
                token: *token,
                owner: Address::ZERO,
                source,
            },
        )?;
        self.token_supply.put(rwtxn, token, &supply)?;
        Ok(())
    }
}
