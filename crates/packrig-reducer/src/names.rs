/// One extension-point name or an ordered sequence of them.
///
/// Reducing through a sequence is a left-to-right fold: the value produced by
/// the first name is the input of the second, and so on.
#[derive(Debug, Clone, Copy)]
pub enum Names<'a> {
    One(&'a str),
    Borrowed(&'a [&'a str]),
    Owned(&'a [String]),
}

impl<'a> Names<'a> {
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match *self {
            Names::One(name) => Box::new(std::iter::once(name)),
            Names::Borrowed(names) => Box::new(names.iter().copied()),
            Names::Owned(names) => Box::new(names.iter().map(String::as_str)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Names::One(_) => 1,
            Names::Borrowed(names) => names.len(),
            Names::Owned(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a str> for Names<'a> {
    fn from(name: &'a str) -> Self {
        Names::One(name)
    }
}

impl<'a> From<&'a String> for Names<'a> {
    fn from(name: &'a String) -> Self {
        Names::One(name.as_str())
    }
}

impl<'a> From<&'a [&'a str]> for Names<'a> {
    fn from(names: &'a [&'a str]) -> Self {
        Names::Borrowed(names)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for Names<'a> {
    fn from(names: &'a [&'a str; N]) -> Self {
        Names::Borrowed(names.as_slice())
    }
}

impl<'a> From<&'a Vec<&'a str>> for Names<'a> {
    fn from(names: &'a Vec<&'a str>) -> Self {
        Names::Borrowed(names.as_slice())
    }
}

impl<'a> From<&'a [String]> for Names<'a> {
    fn from(names: &'a [String]) -> Self {
        Names::Owned(names)
    }
}

impl<'a> From<&'a Vec<String>> for Names<'a> {
    fn from(names: &'a Vec<String>) -> Self {
        Names::Owned(names.as_slice())
    }
}
