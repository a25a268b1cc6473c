
use assertables::*;
use rstest::*;

use crate::prelude::*;
use crate::testutils::*;
