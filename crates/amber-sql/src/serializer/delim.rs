use super::{Formatter, ToSql};

/// Comma delimited
pub(super) struct Comma<L>(pub(super) L);

/// `and` delimited
pub(super) struct And<L>(pub(super) L);

fn delimited<L>(list: L, delimiter: &str, f: &mut Formatter<'_>)
where
    L: IntoIterator,
    L::Item: ToSql,
{
    let mut s = "";
    for i in list {
        fmt!(f, s, i);
        s = delimiter;
    }
}

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, f: &mut Formatter<'_>) {
        delimited(self.0, ", ", f);
    }
}

impl<L> ToSql for And<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, f: &mut Formatter<'_>) {
        delimited(self.0, " and ", f);
    }
}
