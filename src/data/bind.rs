//! Binds a dynamically-built `Params` vector onto an sqlx query in
//! placeholder order. Kept separate from `sql_clauses` so the clause
//! builders stay pure string/Vec code with no sqlx dependency.

use sqlx::mysql::MySqlArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::MySql;

use super::sql_clauses::{BindValue, Params};

pub fn bind_query<'q>(mut q: Query<'q, MySql, MySqlArguments>, params: &'q Params) -> Query<'q, MySql, MySqlArguments> {
    for p in params {
        q = match p {
            BindValue::I64(v) => q.bind(v),
            BindValue::Str(v) => q.bind(v),
            BindValue::DateTime(v) => q.bind(v),
        };
    }
    q
}

pub fn bind_query_as<'q, O>(
    mut q: QueryAs<'q, MySql, O, MySqlArguments>,
    params: &'q Params,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for p in params {
        q = match p {
            BindValue::I64(v) => q.bind(v),
            BindValue::Str(v) => q.bind(v),
            BindValue::DateTime(v) => q.bind(v),
        };
    }
    q
}
