use tokio_postgres::types::Type;

pub struct Sql {
    pub query: &'static str,
    pub types: &'static [Type],
}

pub mod entities {
    use super::*;

    pub const GET: Sql = Sql {
        query: "select id, name, status, created, updated from entities where id = $1",
        types: &[Type::VARCHAR],
    };

    pub const LIST: Sql = Sql {
        query: "select id, name, status, created, updated from entities order by created, id offset $1 limit $2",
        types: &[Type::INT8, Type::INT8],
    };

    pub const CREATE: Sql = Sql {
        query: "insert into entities (id, name, status) values ($1, $2, $3) returning id, name, status, created, updated",
        types: &[Type::VARCHAR, Type::VARCHAR, Type::VARCHAR],
    };

    pub const SET_STATUS: Sql = Sql {
        query: "update entities set status = $2, updated = now() where id = $1 returning id, name, status, created, updated",
        types: &[Type::VARCHAR, Type::VARCHAR],
    };

    pub const ALL: [&Sql; 4] = [&GET, &LIST, &CREATE, &SET_STATUS];
}

pub mod feedback {
    use super::*;

    pub const APPEND: Sql = Sql {
        query: "insert into feedback (id, entity_id, rating, comment, author, created_at) values ($1, $2, $3, $4, $5, $6) returning id, entity_id, rating, comment, author, created_at",
        types: &[
            Type::UUID,
            Type::VARCHAR,
            Type::INT2,
            Type::TEXT,
            Type::VARCHAR,
            Type::TIMESTAMPTZ,
        ],
    };

    pub const QUERY: Sql = Sql {
        query: "select id, entity_id, rating, comment, author, created_at from feedback where entity_id = $1 order by created_at desc, id desc",
        types: &[Type::VARCHAR],
    };

    pub const ALL: [&Sql; 2] = [&APPEND, &QUERY];
}
